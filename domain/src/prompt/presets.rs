//! Named instruction presets
//!
//! Builders accept either a preset name or a literal template string. An
//! unknown name passes through unchanged and is parsed as a literal, so
//! callers write `"debate"` and `"${previous_responses}\nRebut."`
//! interchangeably.

/// Resolve a combination-instructions preset name, or pass a literal through
pub fn combination_instructions(name_or_literal: &str) -> &str {
    match name_or_literal {
        "default" => {
            "Incorporate the previous responses where they are relevant to the task.\n\
             Previous responses:\n${previous_responses}"
        }
        "chain" => {
            "Build on the previous responses: keep what is right, correct what is wrong, \
             and add what is missing.\nPrevious responses:\n${previous_responses}"
        }
        "debate" => {
            "You are in a debate. Rebut the points you disagree with and concede the ones \
             that are right.\nPrevious positions:\n${previous_responses}"
        }
        "voting" => {
            "The previous responses are candidate answers. Vote for the one you find most \
             convincing and explain your vote.\nCandidates:\n${previous_responses}"
        }
        other => other,
    }
}

/// Resolve a persona-template preset name, or pass a literal through
pub fn persona_template(name_or_literal: &str) -> &str {
    match name_or_literal {
        "default" => {
            "INSTRUCTIONS\nAdopt the following persona and answer in its voice. Do not \
             break character.\nPERSONA:\n${persona}"
        }
        other => other,
    }
}

/// Resolve a moderator persona preset name, or pass a literal through
pub fn moderator_persona(name_or_literal: &str) -> &str {
    match name_or_literal {
        "default" => {
            "You are a neutral moderator overseeing a discussion about the following \
             task: ${task}"
        }
        "voting" => {
            "You are a returning officer tallying votes cast on the following task: ${task}"
        }
        other => other,
    }
}

/// Resolve a moderator-instructions preset name, or pass a literal through
pub fn moderator_instructions(name_or_literal: &str) -> &str {
    match name_or_literal {
        "default" => {
            "Synthesize the responses below into a single balanced answer to the task. \
             Do not refer to the respondents individually.\n\
             Responses:\n${previous_responses}"
        }
        "voting" => {
            "Tally the votes in the responses below and report the winning option along \
             with the count.\nVotes:\n${previous_responses}"
        }
        other => other,
    }
}
