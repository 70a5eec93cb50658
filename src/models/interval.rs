use serde::{Deserialize, Serialize};

/// A completed timed span: `[start, end]` in milliseconds since the Unix
/// epoch. The tuple layout is the wire format — storage, export and import
/// all see a two-element JSON number array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval(pub i64, pub i64);

impl Interval {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self(start_ms, end_ms)
    }

    pub fn start_ms(&self) -> i64 {
        self.0
    }

    pub fn end_ms(&self) -> i64 {
        self.1
    }

    /// Raw `end - start`. Negative when the wall clock moved backward
    /// between the two toggles; not clamped.
    pub fn duration_ms(&self) -> i64 {
        self.1 - self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        assert_eq!(Interval::new(0, 1000).duration_ms(), 1000);
        assert_eq!(Interval::new(200, 500).duration_ms(), 300);
    }

    #[test]
    fn test_negative_duration_passes_through() {
        assert_eq!(Interval::new(1000, 400).duration_ms(), -600);
    }

    #[test]
    fn test_wire_format_is_pair_array() {
        let encoded = serde_json::to_string(&Interval::new(0, 1000)).unwrap();
        assert_eq!(encoded, "[0,1000]");

        let decoded: Interval = serde_json::from_str("[200,500]").unwrap();
        assert_eq!(decoded, Interval::new(200, 500));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert!(serde_json::from_str::<Interval>("[0,1,2]").is_err());
        assert!(serde_json::from_str::<Interval>("[0]").is_err());
    }
}
