//! Typed trainer configuration assembled from a [`ConfigStore`].
//!
//! | Prefix | Target |
//! |--------|--------|
//! | `controller.*` | [`ControllerConfig`] field names |
//! | `filter.*` | [`FilterConfig`] |
//! | `link.*` | [`LinkConfig`] field names |
//! | `session.*` | [`SessionConfig`] |
//!
//! `session.tick_hz` defaults to `controller.tick_hz`, and `filter.sample_hz`
//! to the session rate, so one key sets the loop rate everywhere.

use balance_control::{ControllerConfig, CopPoint};
use balance_errors::{ConfigError, ConfigResult, config::check_range, validate};
use balance_filters::{CascadeFilter, MAX_ORDER, PassType};
use balance_link::LinkConfig;
use serde::{Deserialize, Serialize};

use crate::store::ConfigStore;

/// CoP conditioning filter applied to both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Butterworth cutoff (Hz)
    pub cutoff_hz: f64,
    /// Sample rate (Hz); must equal the tick rate
    pub sample_hz: f64,
    /// Butterworth order
    pub order: usize,
    /// High-pass instead of low-pass
    pub high_pass: bool,
    /// Use an N-sample moving average instead of a Butterworth design
    pub moving_average_window: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 0.4615,
            sample_hz: 20.0,
            order: 2,
            high_pass: false,
            moving_average_window: None,
        }
    }
}

impl FilterConfig {
    /// Filter band selected by `high_pass`.
    pub fn pass(&self) -> PassType {
        if self.high_pass {
            PassType::HighPass
        } else {
            PassType::LowPass
        }
    }

    /// Construct one filter instance.
    ///
    /// # Errors
    ///
    /// Whatever [`CascadeFilter`] rejects.
    pub fn build(&self) -> ConfigResult<CascadeFilter> {
        match self.moving_average_window {
            Some(window) => CascadeFilter::moving_average(window),
            None => CascadeFilter::butterworth(self.cutoff_hz, self.sample_hz, self.order, self.pass()),
        }
    }

    /// Check the design without keeping the filter.
    ///
    /// # Errors
    ///
    /// The first parameter that would make [`build`](Self::build) fail.
    pub fn validate(&self) -> ConfigResult<()> {
        validate!(
            (1..=MAX_ORDER).contains(&self.order),
            ConfigError::out_of_range("filter.order", self.order, 1, MAX_ORDER)
        );
        self.build().map(|_| ())
    }
}

/// Session timing and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Control loop rate (Hz)
    pub tick_hz: f64,
    /// Session length (s)
    pub duration_s: f64,
    /// Initial target, lateral (cm)
    pub target_x: f64,
    /// Initial target, anterior-posterior (cm)
    pub target_y: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_hz: 20.0,
            duration_s: 60.0,
            target_x: 0.0,
            target_y: 4.0,
        }
    }
}

impl SessionConfig {
    /// Initial target as a CoP point.
    pub fn target(&self) -> CopPoint {
        CopPoint::new(self.target_x, self.target_y)
    }

    /// Whole ticks in the session, rounded up.
    pub fn total_ticks(&self) -> u64 {
        let ticks = (self.duration_s * self.tick_hz - 1e-9).ceil();
        if ticks.is_finite() && ticks > 0.0 {
            ticks as u64
        } else {
            0
        }
    }

    /// Check timing and target ranges.
    ///
    /// # Errors
    ///
    /// Non-finite or out-of-range timing or target values.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("session.tick_hz", self.tick_hz, 1.0, 2000.0)?;
        check_range("session.duration_s", self.duration_s, 0.0, 86_400.0)?;
        check_range("session.target_x", self.target_x, -50.0, 50.0)?;
        check_range("session.target_y", self.target_y, -50.0, 50.0)?;
        Ok(())
    }
}

/// Everything a session needs, validated together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Subject anthropometrics, torque ranges and gains (`controller.*`)
    pub controller: ControllerConfig,
    /// CoP conditioning (`filter.*`)
    pub filter: FilterConfig,
    /// Stimulator serial link (`link.*`)
    pub link: LinkConfig,
    /// Loop rate, duration and target (`session.*`)
    pub session: SessionConfig,
}

impl TrainerConfig {
    /// Overlay the store on the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidType`] for integer keys holding fractional or
    /// negative values, [`ConfigError::OutOfRange`] for a delimiter outside
    /// a byte.
    pub fn from_store(store: &ConfigStore) -> ConfigResult<Self> {
        let controller = controller_from_store(store)?;

        let d = SessionConfig::default();
        let session = SessionConfig {
            tick_hz: store.get_or("session.tick_hz", controller.tick_hz),
            duration_s: store.get_or("session.duration_s", d.duration_s),
            target_x: store.get_or("session.target_x", d.target_x),
            target_y: store.get_or("session.target_y", d.target_y),
        };

        let d = FilterConfig::default();
        let moving_average_window = match store.get("filter.moving_average_window") {
            Some(_) => Some(store.get_usize_or("filter.moving_average_window", 0)?),
            None => None,
        };
        let filter = FilterConfig {
            cutoff_hz: store.get_or("filter.cutoff_hz", d.cutoff_hz),
            sample_hz: store.get_or("filter.sample_hz", session.tick_hz),
            order: store.get_usize_or("filter.order", d.order)?,
            high_pass: store.get_bool_or("filter.high_pass", d.high_pass),
            moving_average_window,
        };

        let d = LinkConfig::default();
        let delimiter = store.get_u64_or("link.delimiter", u64::from(d.delimiter))?;
        let baud_rate = store.get_u64_or("link.baud_rate", u64::from(d.baud_rate))?;
        let link = LinkConfig {
            baud_rate: u32::try_from(baud_rate).map_err(|e| {
                ConfigError::invalid_type("link.baud_rate", "u32", format!("{baud_rate} ({e})"))
            })?,
            connect_timeout_ms: store.get_u64_or("link.connect_timeout_ms", d.connect_timeout_ms)?,
            read_timeout_ms: store.get_u64_or("link.read_timeout_ms", d.read_timeout_ms)?,
            write_timeout_ms: store.get_u64_or("link.write_timeout_ms", d.write_timeout_ms)?,
            max_unread_messages: store.get_usize_or("link.max_unread_messages", d.max_unread_messages)?,
            read_buffer_len: store.get_usize_or("link.read_buffer_len", d.read_buffer_len)?,
            delimiter: u8::try_from(delimiter).map_err(|e| {
                ConfigError::invalid_type("link.delimiter", "byte", format!("{delimiter} ({e})"))
            })?,
            read_enabled: store.get_bool_or("link.read_enabled", d.read_enabled),
        };

        Ok(Self {
            controller,
            filter,
            link,
            session,
        })
    }

    /// Validate every section and check the three rates agree.
    ///
    /// # Errors
    ///
    /// The first failing section, or [`ConfigError::OutOfRange`] naming the
    /// rate that disagrees with `controller.tick_hz`.
    pub fn validate(&self) -> ConfigResult<()> {
        self.controller.validate()?;
        self.filter.validate()?;
        self.link.validate()?;
        self.session.validate()?;

        let tick_hz = self.controller.tick_hz;
        for (field, rate) in [
            ("session.tick_hz", self.session.tick_hz),
            ("filter.sample_hz", self.filter.sample_hz),
        ] {
            if (rate - tick_hz).abs() > 1e-9 {
                return Err(ConfigError::out_of_range(field, rate, tick_hz, tick_hz));
            }
        }
        Ok(())
    }
}

fn controller_from_store(store: &ConfigStore) -> ConfigResult<ControllerConfig> {
    let d = ControllerConfig::default();
    let key = |name: &str| format!("controller.{name}");
    let f = |name: &str, default: f64| store.get_or(&key(name), default);

    Ok(ControllerConfig {
        body_height_m: f("body_height_m", d.body_height_m),
        body_mass_kg: f("body_mass_kg", d.body_mass_kg),
        ankle_mass_fraction: f("ankle_mass_fraction", d.ankle_mass_fraction),
        com_height_fraction: f("com_height_fraction", d.com_height_fraction),
        inertia_coefficient: f("inertia_coefficient", d.inertia_coefficient),
        gravity: f("gravity", d.gravity),
        ankle_offset_cm: f("ankle_offset_cm", d.ankle_offset_cm),
        quiet_standing_cm: f("quiet_standing_cm", d.quiet_standing_cm),
        los_forward_cm: f("los_forward_cm", d.los_forward_cm),
        los_backward_cm: f("los_backward_cm", d.los_backward_cm),
        los_left_cm: f("los_left_cm", d.los_left_cm),
        los_right_cm: f("los_right_cm", d.los_right_cm),
        max_amplitude: store.get_array_or(&key("max_amplitude"), d.max_amplitude),
        bias_plantarflexion: store.get_array_or(&key("bias_plantarflexion"), d.bias_plantarflexion),
        bias_dorsiflexion: store.get_array_or(&key("bias_dorsiflexion"), d.bias_dorsiflexion),
        neural_kp_factor: f("neural_kp_factor", d.neural_kp_factor),
        neural_kd_factor: f("neural_kd_factor", d.neural_kd_factor),
        mech_stiffness_factor: f("mech_stiffness_factor", d.mech_stiffness_factor),
        mech_damping: f("mech_damping", d.mech_damping),
        derivative_median_window: store
            .get_usize_or(&key("derivative_median_window"), d.derivative_median_window)?,
        ramp_duration_s: f("ramp_duration_s", d.ramp_duration_s),
        tick_hz: f("tick_hz", d.tick_hz),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_test_helpers::must;

    #[test]
    fn test_empty_store_gives_defaults() {
        let config = must(TrainerConfig::from_store(&ConfigStore::new()));
        assert_eq!(config, TrainerConfig::default());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_tick_rate_propagates() {
        let mut store = ConfigStore::new();
        store.insert("controller.tick_hz", 50.0);
        let config = must(TrainerConfig::from_store(&store));
        assert_eq!(config.session.tick_hz, 50.0);
        assert_eq!(config.filter.sample_hz, 50.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_mismatched_rates_rejected() {
        let mut store = ConfigStore::new();
        store.insert("filter.sample_hz", 100.0);
        let config = must(TrainerConfig::from_store(&store));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { ref field, .. }) if field == "filter.sample_hz"
        ));
    }

    #[test]
    fn test_overrides_from_yaml() {
        let store = must(ConfigStore::from_yaml_str(
            "controller:\n  body_mass_kg: 82\n  max_amplitude: [35, 35]\nfilter:\n  order: 4\n  moving_average_window: 5\nlink:\n  read_enabled: true\n  delimiter: 13\n  baud_rate: 9600\nsession:\n  duration_s: 30\n",
        ));
        let config = must(TrainerConfig::from_store(&store));
        assert_eq!(config.controller.body_mass_kg, 82.0);
        assert_eq!(config.controller.max_amplitude, [35.0, 35.0, 30.0, 30.0]);
        assert_eq!(config.filter.order, 4);
        assert_eq!(config.filter.moving_average_window, Some(5));
        assert!(config.link.read_enabled);
        assert_eq!(config.link.delimiter, b'\r');
        assert_eq!(config.link.baud_rate, 9_600);
        assert_eq!(config.session.total_ticks(), 600);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_delimiter_must_fit_a_byte() {
        let mut store = ConfigStore::new();
        store.insert("link.delimiter", 300.0);
        assert!(TrainerConfig::from_store(&store).is_err());
    }

    #[test]
    fn test_filter_order_checked() {
        let filter = FilterConfig {
            order: 0,
            ..FilterConfig::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_total_ticks_rounds_up() {
        let session = SessionConfig {
            tick_hz: 20.0,
            duration_s: 1.01,
            ..SessionConfig::default()
        };
        assert_eq!(session.total_ticks(), 21);
        let exact = SessionConfig {
            duration_s: 2.0,
            ..session
        };
        assert_eq!(exact.total_ticks(), 40);
    }
}
