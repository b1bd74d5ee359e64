use std::str::FromStr;

/// Selects the source lines whose processing is traced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingConfig {
    All,
    Between(usize, usize),
    Before(usize),
    After(usize),
    Only(usize),
    Off,
}

impl TracingConfig {
    /// True when statements on line `ln` (1-based) are traced
    pub fn includes(&self, ln: usize) -> bool {
        match *self {
            TracingConfig::All => true,
            TracingConfig::Between(start, end) => ln >= start && ln <= end,
            TracingConfig::Before(end) => ln <= end,
            TracingConfig::After(start) => ln >= start,
            TracingConfig::Only(only) => ln == only,
            TracingConfig::Off => false,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig::Off
    }
}

/**
Parses the value of a tracing flag: `all`, `off`, a single line `N`, a range
`N:M`, or an open range `:M` / `N:`.
 */
impl FromStr for TracingConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid line number in tracing range: {}", s))
        };

        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(TracingConfig::All),
            "off" => Ok(TracingConfig::Off),
            range => match range.split_once(':') {
                Some(("", "")) => Ok(TracingConfig::All),
                Some((start, "")) => Ok(TracingConfig::After(line(start)?)),
                Some(("", end)) => Ok(TracingConfig::Before(line(end)?)),
                Some((start, end)) => Ok(TracingConfig::Between(line(start)?, line(end)?)),
                None => Ok(TracingConfig::Only(line(range)?)),
            },
        }
    }
}

pub trait Tracing {
    fn set_tracing(&mut self, config: TracingConfig);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ranges() {
        let tests = vec![
            ("all", TracingConfig::All),
            ("off", TracingConfig::Off),
            ("5", TracingConfig::Only(5)),
            ("3:9", TracingConfig::Between(3, 9)),
            (":9", TracingConfig::Before(9)),
            ("3:", TracingConfig::After(3)),
        ];
        for (text, expected) in tests {
            assert_eq!(text.parse::<TracingConfig>(), Ok(expected), "{}", text);
        }
        assert!("x:1".parse::<TracingConfig>().is_err());
    }

    #[test]
    fn includes_lines() {
        assert!(TracingConfig::Between(3, 9).includes(3));
        assert!(!TracingConfig::Between(3, 9).includes(10));
        assert!(TracingConfig::Before(4).includes(1));
        assert!(!TracingConfig::Off.includes(1));
    }
}
