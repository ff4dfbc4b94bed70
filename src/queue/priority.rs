use serde::{Deserialize, Serialize};

/// How soon a queued change should reach the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Priority {
    /// Background work such as attachment extraction.
    Low = 1,
    #[default]
    Default = 2,
    High = 3,
    /// Changes the current user is waiting to see.
    Highest = 4,
}

impl Priority {
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Map a numeric value back, clamping to the known range.
    pub fn from_value(value: u8) -> Self {
        match value {
            0 | 1 => Priority::Low,
            2 => Priority::Default,
            3 => Priority::High,
            _ => Priority::Highest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Priority::Highest > Priority::High);
        assert!(Priority::High > Priority::Default);
        assert!(Priority::Default > Priority::Low);
        assert_eq!(Priority::Default.max(Priority::High), Priority::High);
    }

    #[test]
    fn test_value_roundtrip() {
        for p in [Priority::Low, Priority::Default, Priority::High, Priority::Highest] {
            assert_eq!(Priority::from_value(p.value()), p);
        }
        assert_eq!(Priority::from_value(0), Priority::Low);
        assert_eq!(Priority::from_value(200), Priority::Highest);
    }
}
