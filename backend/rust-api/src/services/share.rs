use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::UserStats;

const TWEET_INTENT_URL: &str = "https://twitter.com/intent/tweet";

// Characters encodeURIComponent leaves alone
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn share_text(stats: &UserStats) -> String {
    format!(
        "Linguist Vibeで {} 回の言語探求を完了しました。🎓✨ #LinguistVibe #AcademicEnglish",
        stats.quizzes_completed
    )
}

/// Pre-filled share link for the current stats.
pub fn share_url(stats: &UserStats) -> String {
    format!(
        "{}?text={}",
        TWEET_INTENT_URL,
        utf8_percent_encode(&share_text(stats), URI_COMPONENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_text_like_encode_uri_component() {
        let stats = UserStats {
            quiz_score: 3,
            quizzes_completed: 12,
            scramble_completed: 0,
        };
        let url = share_url(&stats);
        assert!(url.starts_with("https://twitter.com/intent/tweet?text=Linguist%20Vibe"));
        assert!(url.contains("%2012%20"));
        assert!(url.contains("%23LinguistVibe"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn encoded_text_decodes_back() {
        let stats = UserStats::default();
        let url = share_url(&stats);
        let encoded = url.split_once("?text=").unwrap().1;
        let decoded = percent_encoding::percent_decode_str(encoded)
            .decode_utf8()
            .unwrap();
        assert_eq!(decoded, share_text(&stats));
    }
}
