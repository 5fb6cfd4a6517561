//! Physical constants of a neuron.
use serde::{Deserialize, Serialize};

use crate::error::SNNError;

/// The physical constants of a neuron, together with the quantities derived from them.
///
/// A parameter set is immutable once built: the leak conductance, the membrane time constant
/// and the threshold current are computed exactly once, in [`ParameterSetBuilder::build`].
/// Share it between models with an `Arc`.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ParameterSet {
    /// Membrane capacitance (F).
    c_m: f64,
    /// Leak reversal potential (V).
    e_l: f64,
    /// Potassium reversal potential (V).
    e_k: f64,
    /// Membrane resistance (Ohm).
    r_m: f64,
    /// Threshold potential (V).
    v_th: f64,
    /// Reset potential (V).
    v_reset: f64,
    v_peak: Option<f64>,
    // refractory period constants
    tau_vc: Option<f64>,
    tau_vth: Option<f64>,
    v_th_max: Option<f64>,
    tau_g_ref: Option<f64>,
    // spike rate adaptation constants
    g_sra: Option<f64>,
    delta_g_sra: Option<f64>,
    tau_sra: Option<f64>,
    v_max: Option<f64>,
    delta_th: Option<f64>,
    a: Option<f64>,
    b: Option<f64>,
    #[serde(skip)]
    g_l: f64,
    #[serde(skip)]
    tau_m: f64,
    #[serde(skip)]
    i_th: f64,
}

impl ParameterSet {
    /// Start building a parameter set from the constants every model needs.
    pub fn builder(c_m: f64, e_l: f64, e_k: f64, r_m: f64, v_th: f64, v_reset: f64) -> ParameterSetBuilder {
        ParameterSetBuilder {
            c_m,
            e_l,
            e_k,
            r_m,
            v_th,
            v_reset,
            ..Default::default()
        }
    }

    /// Returns the membrane capacitance.
    pub fn c_m(&self) -> f64 {
        self.c_m
    }

    /// Returns the leak reversal potential.
    pub fn e_l(&self) -> f64 {
        self.e_l
    }

    /// Returns the potassium reversal potential.
    pub fn e_k(&self) -> f64 {
        self.e_k
    }

    /// Returns the membrane resistance.
    pub fn r_m(&self) -> f64 {
        self.r_m
    }

    /// Returns the threshold potential.
    pub fn v_th(&self) -> f64 {
        self.v_th
    }

    /// Returns the reset potential.
    pub fn v_reset(&self) -> f64 {
        self.v_reset
    }

    /// Returns the peak voltage of the spike waveform, if any.
    pub fn v_peak(&self) -> Option<f64> {
        self.v_peak
    }

    /// Returns the time constant of the voltage clamp refractory method, if any.
    pub fn tau_vc(&self) -> Option<f64> {
        self.tau_vc
    }

    /// Returns the time constant of the threshold increase refractory method, if any.
    pub fn tau_vth(&self) -> Option<f64> {
        self.tau_vth
    }

    /// Returns the maximum threshold of the threshold increase refractory method, if any.
    pub fn v_th_max(&self) -> Option<f64> {
        self.v_th_max
    }

    /// Returns the time constant of the conductance increase refractory method, if any.
    pub fn tau_g_ref(&self) -> Option<f64> {
        self.tau_g_ref
    }

    /// Returns the spike rate adaptation conductance, if any.
    pub fn g_sra(&self) -> Option<f64> {
        self.g_sra
    }

    /// Returns the adaptation conductance increment per spike, if any.
    pub fn delta_g_sra(&self) -> Option<f64> {
        self.delta_g_sra
    }

    /// Returns the time constant of the spike rate adaptation current, if any.
    pub fn tau_sra(&self) -> Option<f64> {
        self.tau_sra
    }

    /// Returns the peak voltage at which an adaptive neuron is reset, if any.
    pub fn v_max(&self) -> Option<f64> {
        self.v_max
    }

    /// Returns the sharpness of the exponential spike upswing, if any.
    pub fn delta_th(&self) -> Option<f64> {
        self.delta_th
    }

    /// Returns the subthreshold adaptation conductance, if any.
    pub fn a(&self) -> Option<f64> {
        self.a
    }

    /// Returns the adaptation current increment per spike, if any.
    pub fn b(&self) -> Option<f64> {
        self.b
    }

    /// Returns the leak conductance, i.e., `1 / r_m`.
    pub fn g_l(&self) -> f64 {
        self.g_l
    }

    /// Returns the membrane time constant, i.e., `c_m / g_l`.
    pub fn tau_m(&self) -> f64 {
        self.tau_m
    }

    /// Returns the threshold current, i.e., the smallest constant current that drives the
    /// membrane from rest to the threshold potential: `g_l * (v_th - e_l)`.
    pub fn i_th(&self) -> f64 {
        self.i_th
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let builder = ParameterSetBuilder::deserialize(deserializer)?;
        builder.build().map_err(serde::de::Error::custom)
    }
}

/// Builder for [`ParameterSet`], holding the optional constants until the set is validated.
#[derive(Debug, PartialEq, Clone, Default, Deserialize)]
pub struct ParameterSetBuilder {
    c_m: f64,
    e_l: f64,
    e_k: f64,
    r_m: f64,
    v_th: f64,
    v_reset: f64,
    #[serde(default)]
    v_peak: Option<f64>,
    #[serde(default)]
    tau_vc: Option<f64>,
    #[serde(default)]
    tau_vth: Option<f64>,
    #[serde(default)]
    v_th_max: Option<f64>,
    #[serde(default)]
    tau_g_ref: Option<f64>,
    #[serde(default)]
    g_sra: Option<f64>,
    #[serde(default)]
    delta_g_sra: Option<f64>,
    #[serde(default)]
    tau_sra: Option<f64>,
    #[serde(default)]
    v_max: Option<f64>,
    #[serde(default)]
    delta_th: Option<f64>,
    #[serde(default)]
    a: Option<f64>,
    #[serde(default)]
    b: Option<f64>,
}

impl ParameterSetBuilder {
    /// Set the peak voltage of the spike waveform.
    pub fn v_peak(mut self, v_peak: f64) -> Self {
        self.v_peak = Some(v_peak);
        self
    }

    /// Set the time constant of the voltage clamp refractory method.
    pub fn tau_vc(mut self, tau_vc: f64) -> Self {
        self.tau_vc = Some(tau_vc);
        self
    }

    /// Set the time constant of the threshold increase refractory method.
    pub fn tau_vth(mut self, tau_vth: f64) -> Self {
        self.tau_vth = Some(tau_vth);
        self
    }

    /// Set the maximum threshold of the threshold increase refractory method.
    pub fn v_th_max(mut self, v_th_max: f64) -> Self {
        self.v_th_max = Some(v_th_max);
        self
    }

    /// Set the time constant of the conductance increase refractory method.
    pub fn tau_g_ref(mut self, tau_g_ref: f64) -> Self {
        self.tau_g_ref = Some(tau_g_ref);
        self
    }

    /// Set the spike rate adaptation conductance.
    pub fn g_sra(mut self, g_sra: f64) -> Self {
        self.g_sra = Some(g_sra);
        self
    }

    /// Set the adaptation conductance increment per spike.
    pub fn delta_g_sra(mut self, delta_g_sra: f64) -> Self {
        self.delta_g_sra = Some(delta_g_sra);
        self
    }

    /// Set the time constant of the spike rate adaptation current.
    pub fn tau_sra(mut self, tau_sra: f64) -> Self {
        self.tau_sra = Some(tau_sra);
        self
    }

    /// Set the peak voltage at which an adaptive neuron is reset.
    pub fn v_max(mut self, v_max: f64) -> Self {
        self.v_max = Some(v_max);
        self
    }

    /// Set the sharpness of the exponential spike upswing.
    pub fn delta_th(mut self, delta_th: f64) -> Self {
        self.delta_th = Some(delta_th);
        self
    }

    /// Set the subthreshold adaptation conductance.
    pub fn a(mut self, a: f64) -> Self {
        self.a = Some(a);
        self
    }

    /// Set the adaptation current increment per spike.
    pub fn b(mut self, b: f64) -> Self {
        self.b = Some(b);
        self
    }

    /// Validate the constants and compute the derived quantities.
    /// The function returns an error if the membrane resistance or capacitance is not a positive
    /// finite number, or if any provided constant is not finite.
    pub fn build(self) -> Result<ParameterSet, SNNError> {
        if !(self.r_m.is_finite() && self.r_m > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The membrane resistance must be positive and finite, got {}",
                self.r_m
            )));
        }

        if !(self.c_m.is_finite() && self.c_m > 0.0) {
            return Err(SNNError::InvalidParameter(format!(
                "The membrane capacitance must be positive and finite, got {}",
                self.c_m
            )));
        }

        let required = [
            ("e_l", Some(self.e_l)),
            ("e_k", Some(self.e_k)),
            ("v_th", Some(self.v_th)),
            ("v_reset", Some(self.v_reset)),
        ];
        let optional = [
            ("v_peak", self.v_peak),
            ("tau_vc", self.tau_vc),
            ("tau_vth", self.tau_vth),
            ("v_th_max", self.v_th_max),
            ("tau_g_ref", self.tau_g_ref),
            ("g_sra", self.g_sra),
            ("delta_g_sra", self.delta_g_sra),
            ("tau_sra", self.tau_sra),
            ("v_max", self.v_max),
            ("delta_th", self.delta_th),
            ("a", self.a),
            ("b", self.b),
        ];
        if let Some((name, value)) = required
            .iter()
            .chain(optional.iter())
            .find_map(|(name, value)| value.filter(|v| !v.is_finite()).map(|v| (name, v)))
        {
            return Err(SNNError::InvalidParameter(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        let g_l = 1.0 / self.r_m;
        let tau_m = self.c_m / g_l;
        let i_th = g_l * (self.v_th - self.e_l);

        Ok(ParameterSet {
            c_m: self.c_m,
            e_l: self.e_l,
            e_k: self.e_k,
            r_m: self.r_m,
            v_th: self.v_th,
            v_reset: self.v_reset,
            v_peak: self.v_peak,
            tau_vc: self.tau_vc,
            tau_vth: self.tau_vth,
            v_th_max: self.v_th_max,
            tau_g_ref: self.tau_g_ref,
            g_sra: self.g_sra,
            delta_g_sra: self.delta_g_sra,
            tau_sra: self.tau_sra,
            v_max: self.v_max,
            delta_th: self.delta_th,
            a: self.a,
            b: self.b,
            g_l,
            tau_m,
            i_th,
        })
    }
}
