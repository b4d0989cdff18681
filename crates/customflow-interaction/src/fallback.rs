//! Canned replies used when no API credential is configured.

use customflow_core::ai::Tone;

const FRIENDLY: &[&str] = &[
    "Thank you for reaching out about custom table covers! I'd be happy to help you with your order. Could you please share the dimensions and any specific requirements?",
    "Hi there! Thanks for your interest in our table covers. We create high-quality custom covers to fit perfectly. What size do you need?",
];

const FORMAL: &[&str] = &[
    "Thank you for your inquiry. We would be pleased to assist with your custom table cover requirements. Please provide dimensions and specifications.",
    "We acknowledge your request for custom table cover services. Kindly provide the measurements and material preferences.",
];

const SHORT: &[&str] = &[
    "Thanks! Please send table dimensions for a quote.",
    "Hi! What size table cover do you need?",
];

/// Picks a reply by the byte length of the message, so equal inputs always
/// get the same reply.
pub fn fallback_reply(message: &str, tone: Tone) -> &'static str {
    let table = match tone {
        Tone::Friendly => FRIENDLY,
        Tone::Formal => FORMAL,
        Tone::Short => SHORT,
    };
    table[message.len() % table.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_byte_length_mod_table_size() {
        assert_eq!(fallback_reply("", Tone::Short), SHORT[0]);
        assert_eq!(fallback_reply("a", Tone::Short), SHORT[1]);
        // "é" is two bytes.
        assert_eq!(fallback_reply("é", Tone::Formal), FORMAL[0]);
        assert_eq!(fallback_reply("abc", Tone::Friendly), FRIENDLY[1]);
    }

    #[test]
    fn test_deterministic() {
        let msg = "Hello, I need a cover for a 6 seater table";
        assert_eq!(
            fallback_reply(msg, Tone::Friendly),
            fallback_reply(msg, Tone::Friendly)
        );
    }
}
