//! Predicate factories for character-class patterns.

/// Membership test for the inclusive code-point range `low..=high`.
pub fn range(low: char, high: char) -> impl Fn(char) -> bool {
    move |rune| low <= rune && rune <= high
}

/// Membership test over the code points of `set`.
///
/// The set is copied, so the predicate does not borrow from the caller.
pub fn one_of(set: &str) -> impl Fn(char) -> bool + use<> {
    let set = set.to_owned();
    move |rune| set.contains(rune)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive() {
        let digit = range('0', '9');
        assert!(digit('0'));
        assert!(digit('5'));
        assert!(digit('9'));
        assert!(!digit('a'));
        assert!(!digit('/'));
    }

    #[test]
    fn one_of_tests_membership() {
        let sign = one_of("-+");
        assert!(sign('-'));
        assert!(sign('+'));
        assert!(!sign('*'));
    }

    #[test]
    fn one_of_handles_multibyte_sets() {
        let arrows = one_of("←→");
        assert!(arrows('→'));
        assert!(!arrows('-'));
    }
}
