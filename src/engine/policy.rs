//! Pass-through policy: whether a processed line is forwarded.

use crate::config::Config;

/// What happens to a line after it has been matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Forward,
    Eat,
}

impl Disposition {
    #[inline]
    pub fn is_forward(self) -> bool {
        self == Disposition::Forward
    }
}

/// The two eat flags, fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThrough {
    pub eat_all: bool,
    pub eat_matches: bool,
}

impl PassThrough {
    pub fn from_config(config: &Config) -> Self {
        Self {
            eat_all: config.eat_all,
            eat_matches: config.eat_matches,
        }
    }

    #[inline]
    pub fn decide(self, matched: bool) -> Disposition {
        if self.eat_all || (matched && self.eat_matches) {
            Disposition::Eat
        } else {
            Disposition::Forward
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_truth_table() {
        use Disposition::*;
        let cases = [
            // eat_all, eat_matches, matched, expected
            (false, false, false, Forward),
            (false, false, true, Forward),
            (false, true, false, Forward),
            (false, true, true, Eat),
            (true, false, false, Eat),
            (true, false, true, Eat),
            (true, true, false, Eat),
            (true, true, true, Eat),
        ];
        for (eat_all, eat_matches, matched, expected) in cases {
            let policy = PassThrough { eat_all, eat_matches };
            assert_eq!(
                policy.decide(matched),
                expected,
                "eat_all={eat_all} eat_matches={eat_matches} matched={matched}"
            );
        }
    }

    #[test]
    fn default_forwards_everything() {
        assert!(PassThrough::default().decide(true).is_forward());
        assert!(PassThrough::default().decide(false).is_forward());
    }
}
