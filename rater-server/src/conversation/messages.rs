//! Reviewer-facing texts and keyboards.

use rater_core::Sample;

use crate::transport::Keyboard;

pub const EVALUATE_BUTTON: &str = "Evaluate";
pub const CANCEL_BUTTON: &str = "Cancel";
pub const YES_BUTTON: &str = "Yes";
pub const NO_BUTTON: &str = "No";

pub const HELP: &str = "This is a tool for collecting human judgements of generated texts. \
Every text was produced under a tag, and you are asked to rate it on two scales: \
how relevant it is to the tag, and how fluent and correct it is. \
Both are rated from 1 to 5, where 1 means not relevant/fluent at all \
and 5 stands for very relevant/very fluent.\n\n\
Use the /get_text command to get a text and the tag it was generated under. \
After that, you will be prompted to start the evaluation. \
Use /cancel at any time to stop.";

pub const RELEVANCE_PROMPT: &str = "How relevant is the text to the tag?";
pub const QUALITY_PROMPT: &str = "How understandable and correct is the text?";
pub const CONTINUE_PROMPT: &str =
    "Thank you for your response! Would you like to evaluate another text?";
pub const THANKS: &str = "Thank you for your participation!";
pub const EXHAUSTED: &str = "Looks like you've evaluated all available texts! \
I'm very grateful for your help. Feel free to come back later for new ones. \
Get the kitten for now :)";

/// Generic notice for any failed store or transport operation.
pub const FAILURE_REPLY: &str = "An error occurred. Please see the logs.";

pub const PURGE_CONFIRM: &str = "Are you sure you want to delete all data?";
pub const PURGE_DONE: &str = "Successfully cleared all data!";
pub const PURGE_ABORTED: &str = "Nothing was deleted.";

pub const UPLOAD_STARTED: &str = "Started uploading new items...";

pub fn greeting(full_name: &str) -> String {
    format!(
        "Hi {}!\nTo get more info about the project, use the /help command.\n\
         To start evaluating texts, use the /get_text command.",
        escape_html(full_name)
    )
}

pub fn upload_done(count: usize) -> String {
    format!("Successfully uploaded {} items!", count)
}

/// Longest text `sendMessage` accepts, in characters.
pub const MESSAGE_MAX_CHARS: usize = 4096;

const ELLIPSIS: char = '\u{2026}';

/// Sample card, HTML formatted. Long content is cut with an ellipsis so the
/// markup stays within `MESSAGE_MAX_CHARS`.
pub fn sample_card(sample: &Sample) -> String {
    let head = format!("<b>Tag</b>: {}\n<b>Text</b>: ", escape_html(&sample.label));
    let budget = MESSAGE_MAX_CHARS.saturating_sub(head.chars().count());
    let content = escape_html(&sample.content);
    if content.chars().count() <= budget {
        return head + &content;
    }

    let mut card = head;
    let mut used = 0;
    for c in sample.content.chars() {
        let escaped = escaped_len(c);
        if used + escaped + 1 > budget {
            break;
        }
        push_escaped(&mut card, c);
        used += escaped;
    }
    card.push(ELLIPSIS);
    card
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        _ => out.push(c),
    }
}

fn escaped_len(c: char) -> usize {
    match c {
        '&' => 5,
        '<' | '>' => 4,
        _ => 1,
    }
}

pub fn evaluate_keyboard() -> Keyboard {
    Keyboard::single_row(&[EVALUATE_BUTTON], false)
}

pub fn scale_keyboard(one_time: bool) -> Keyboard {
    Keyboard::single_row(&["1", "2", "3", "4", "5", CANCEL_BUTTON], one_time)
}

pub fn yes_no_keyboard(one_time: bool) -> Keyboard {
    Keyboard::single_row(&[YES_BUTTON, NO_BUTTON], one_time)
}
