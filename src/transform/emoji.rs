//! Conversion of Slack emoji names to Mattermost ones.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::report::{Reporter, Warning, WarningKind};

/// Slack skin tone suffixes and their Mattermost qualifiers.
const SKIN_TONES: [(&str, &str); 5] = [
    ("::skin-tone-2", "_light_skin_tone"),
    ("::skin-tone-3", "_medium_light_skin_tone"),
    ("::skin-tone-4", "_medium_skin_tone"),
    ("::skin-tone-5", "_medium_dark_skin_tone"),
    ("::skin-tone-6", "_dark_skin_tone"),
];

static SUPPORTED_EMOJIS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    include_str!("supported_emojis.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});

/// Returns `true` if the target platform knows this emoji name.
pub fn is_supported_emoji(name: &str) -> bool {
    SUPPORTED_EMOJIS.contains(name)
}

/// Converts a Slack emoji name.
///
/// Skin tone suffixes are rewritten, possibly several times. Any other `:`
/// is replaced with `_`. Compound and unknown names are reported but still
/// returned.
pub fn convert_emoji_name(name: &str, reporter: &dyn Reporter) -> String {
    for (slack, mattermost) in SKIN_TONES {
        if let Some(base) = name.strip_suffix(slack) {
            return convert_emoji_name(base, reporter) + mattermost;
        }
    }

    let mut converted = name.to_string();
    if converted.contains(':') {
        reporter.report(Warning::new(
            WarningKind::CompoundEmoji,
            format!("Unsupported compound emoji. emoji={converted}"),
        ));
        converted = converted.replace(':', "_");
    }

    if !is_supported_emoji(&converted) {
        reporter.report(Warning::new(
            WarningKind::UnsupportedEmoji,
            format!("Unsupported emoji. emoji={converted}"),
        ));
    }

    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;

    #[test]
    fn test_plain_names_pass_through() {
        let reporter = CollectingReporter::new();
        assert_eq!(convert_emoji_name("thumbsup", &reporter), "thumbsup");
        assert_eq!(convert_emoji_name("+1", &reporter), "+1");
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_skin_tones() {
        let reporter = CollectingReporter::new();
        let cases = [
            ("wave::skin-tone-2", "wave_light_skin_tone"),
            ("wave::skin-tone-3", "wave_medium_light_skin_tone"),
            ("wave::skin-tone-4", "wave_medium_skin_tone"),
            ("wave::skin-tone-5", "wave_medium_dark_skin_tone"),
            ("wave::skin-tone-6", "wave_dark_skin_tone"),
        ];
        for (slack, expected) in cases {
            assert_eq!(convert_emoji_name(slack, &reporter), expected);
        }
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_stacked_skin_tones_resolve_recursively() {
        let reporter = CollectingReporter::new();
        assert_eq!(
            convert_emoji_name("handshake::skin-tone-2::skin-tone-6", &reporter),
            "handshake_light_skin_tone_dark_skin_tone"
        );
    }

    #[test]
    fn test_compound_emoji_is_flagged_and_rewritten() {
        let reporter = CollectingReporter::new();
        assert_eq!(convert_emoji_name("man:woman", &reporter), "man_woman");
        assert_eq!(reporter.count(WarningKind::CompoundEmoji), 1);
        assert_eq!(reporter.count(WarningKind::UnsupportedEmoji), 1);
    }

    #[test]
    fn test_unknown_emoji_is_flagged() {
        let reporter = CollectingReporter::new();
        assert_eq!(convert_emoji_name("party_parrot", &reporter), "party_parrot");
        assert_eq!(reporter.count(WarningKind::UnsupportedEmoji), 1);
        assert!(!is_supported_emoji("party_parrot"));
        assert!(is_supported_emoji("smile"));
    }

    #[test]
    fn test_newer_platform_emoji_are_supported() {
        let reporter = CollectingReporter::new();
        for name in ["partying_face", "pleading_face", "melting_face", "flag-ua"] {
            assert_eq!(convert_emoji_name(name, &reporter), name);
        }
        assert!(reporter.is_empty());
    }
}
