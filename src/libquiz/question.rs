use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One multiple-choice question as the Open Trivia Database hands it out.
/// The serialized field names match the API payload, so the same struct is
/// used for the fetch response and the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl Question {
    pub fn all_options(&self) -> Vec<String> {
        let mut vec = vec![self.correct_answer.clone()];
        vec.extend(self.incorrect_answers.clone());
        vec
    }

    pub fn options_randomized(&self) -> Vec<String> {
        let mut opts = self.all_options();
        opts.shuffle(&mut rng());
        opts
    }

    pub fn display_text(&self) -> String {
        decode_entities(&self.text)
    }
}

/// Decodes the HTML entities the trivia API embeds in its text (`&quot;`,
/// `&#039;`, numeric forms, ...). Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        // Entity names are short; a far-away semicolon means a bare ampersand.
        match rest[1..].find(';') {
            Some(len) if len <= 10 => match decode_entity(&rest[1..len + 1]) {
                Some(decoded) => {
                    out.push_str(&decoded);
                    rest = &rest[len + 2..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let decoded = match name {
        "quot" => "\"",
        "apos" => "'",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        "deg" => "\u{00B0}",
        "eacute" => "\u{00E9}",
        "auml" => "\u{00E4}",
        "ouml" => "\u{00F6}",
        "uuml" => "\u{00FC}",
        _ => return None,
    };
    Some(decoded.to_string())
}
