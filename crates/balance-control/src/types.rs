//! Plain data shared between acquisition, filtering and control.

use fes_protocol::StimChannel;
use serde::{Deserialize, Serialize};

/// A point on the balance board, in centimeters.
///
/// `x` is mediolateral (positive to the subject's right), `y` is
/// anteroposterior (positive forward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CopPoint {
    /// Mediolateral position (cm)
    pub x: f64,
    /// Anteroposterior position (cm)
    pub y: f64,
}

impl CopPoint {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One control tick's sensor reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the session started
    pub timestamp_s: f64,
    /// Unfiltered center of pressure
    pub raw_cop: CopPoint,
    /// Corner loads in kg: top-left, top-right, bottom-left, bottom-right
    pub corner_loads: [f64; 4],
    /// Filtered center of pressure, once the filter has run
    pub filtered_cop: Option<CopPoint>,
}

impl Sample {
    /// Create an unfiltered sample.
    pub const fn new(timestamp_s: f64, raw_cop: CopPoint, corner_loads: [f64; 4]) -> Self {
        Self {
            timestamp_s,
            raw_cop,
            corner_loads,
            filtered_cop: None,
        }
    }

    /// Copy of this sample carrying the filtered CoP.
    #[must_use]
    pub const fn with_filtered(self, filtered_cop: CopPoint) -> Self {
        Self {
            filtered_cop: Some(filtered_cop),
            ..self
        }
    }

    /// Sum of the four corner loads.
    pub fn total_load(&self) -> f64 {
        self.corner_loads.iter().sum()
    }
}

/// The four stimulation channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Right plantarflexors (wire channel `a`)
    RightPlantarflexion,
    /// Left plantarflexors (wire channel `b`)
    LeftPlantarflexion,
    /// Right dorsiflexors (wire channel `c`)
    RightDorsiflexion,
    /// Left dorsiflexors (wire channel `d`)
    LeftDorsiflexion,
}

impl Channel {
    /// All channels in wire order.
    pub const ALL: [Channel; 4] = [
        Channel::RightPlantarflexion,
        Channel::LeftPlantarflexion,
        Channel::RightDorsiflexion,
        Channel::LeftDorsiflexion,
    ];

    /// Index into per-channel arrays.
    pub const fn index(self) -> usize {
        self.stim_channel().index()
    }

    /// Stimulator output this channel is wired to.
    pub const fn stim_channel(self) -> StimChannel {
        match self {
            Channel::RightPlantarflexion => StimChannel::A,
            Channel::LeftPlantarflexion => StimChannel::B,
            Channel::RightDorsiflexion => StimChannel::C,
            Channel::LeftDorsiflexion => StimChannel::D,
        }
    }

    /// Plantarflexion (calf) channel.
    pub const fn is_plantarflexion(self) -> bool {
        matches!(
            self,
            Channel::RightPlantarflexion | Channel::LeftPlantarflexion
        )
    }

    /// Right-leg channel.
    pub const fn is_right(self) -> bool {
        matches!(
            self,
            Channel::RightPlantarflexion | Channel::RightDorsiflexion
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_wire_mapping() {
        let letters: Vec<u8> = Channel::ALL
            .iter()
            .map(|c| c.stim_channel().letter())
            .collect();
        assert_eq!(letters, b"abcd");
    }

    #[test]
    fn test_channel_index_is_position() {
        for (i, c) in Channel::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_sample_with_filtered() {
        let s = Sample::new(0.5, CopPoint::new(1.0, 2.0), [10.0, 10.0, 10.0, 10.0]);
        assert_eq!(s.filtered_cop, None);
        let f = s.with_filtered(CopPoint::new(0.9, 1.9));
        assert_eq!(f.filtered_cop, Some(CopPoint::new(0.9, 1.9)));
        assert_eq!(f.raw_cop, s.raw_cop);
        assert!((f.total_load() - 40.0).abs() < 1e-12);
    }
}
