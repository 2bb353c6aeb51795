//! Hand-authored prompt pools keyed by intensity tier and dominant theme.

use crate::{Card, ThemeTag};

const WARM_NOSTALGIA: &[&str] = &[
    "What scent or sound instantly transports you to a specific moment from your past?",
    "Which childhood ritual or tradition do you find yourself returning to?",
    "What detail from a happy memory do you hold onto most vividly?",
    "What place from your childhood do you still visit in your dreams?",
    "Which season reminds you most of a particular time in your life?",
    "What song or melody brings back a flood of memories?",
];

const WARM_IDENTITY: &[&str] = &[
    "What small habit or preference reveals something essential about who you are?",
    "When do you feel most comfortable in your own skin?",
    "What quality do others recognize in you that you sometimes overlook?",
    "What part of your personality emerged later in life that surprised you?",
    "How do you recognize when you're not being true to yourself?",
    "What trait do you share with someone you admire?",
];

const WARM_GENERAL: &[&str] = &[
    "What simple moment from your day brings you the most genuine pleasure?",
    "Which person from your past do you think of most fondly, and why?",
    "What ordinary experience have you come to appreciate more as you've grown older?",
    "What small ritual do you perform that centers you?",
    "Which everyday beauty do you pause to notice?",
    "What moment of quiet contentment do you treasure?",
];

const PERSONAL_IDENTITY: &[&str] = &[
    "What aspect of yourself took longest to fully accept?",
    "How do you recognize when you're not being authentic to yourself?",
    "What contradiction within yourself have you learned to embrace?",
    "What part of your identity feels most authentic to you?",
    "When did you realize you'd become someone you hadn't expected?",
    "What quality in yourself do you value most?",
];

const PERSONAL_LOVE: &[&str] = &[
    "How do you know when someone truly understands you?",
    "What gesture of affection means the most to you?",
    "When have you felt most deeply connected to another person?",
    "What makes you feel most loved and appreciated?",
    "How do you express care in ways that go beyond words?",
    "When did you realize someone saw you more clearly than you saw yourself?",
];

const PERSONAL_PHILOSOPHY: &[&str] = &[
    "What belief have you held onto despite others questioning it?",
    "How has your perspective on what matters most shifted over time?",
    "What question about life do you find yourself returning to?",
    "What assumption about how the world works have you had to reconsider?",
    "How has your understanding of what it means to live well evolved?",
    "What wisdom have you gained that you wish you'd had earlier?",
];

const PERSONAL_GENERAL: &[&str] = &[
    "What experience changed how you see yourself?",
    "When did you realize you'd outgrown a previous version of yourself?",
    "What do you understand now that you wish you'd known earlier?",
    "What moment revealed something important about yourself?",
    "How has your relationship with yourself changed over time?",
    "What lesson did you learn the hard way that you're grateful for now?",
];

const DEEP_SHADOW: &[&str] = &[
    "What truth about yourself did you resist acknowledging for the longest time?",
    "When did you realize you'd been wrong about something you were certain of?",
    "What pattern in your life have you struggled to break?",
];

const DEEP_WATERS: &[&str] = &[
    "What emotion have you learned to sit with rather than escape from?",
    "When did you discover you were capable of something you didn't think possible?",
    "What loss taught you something you couldn't have learned any other way?",
];

const DEEP_PHILOSOPHY: &[&str] = &[
    "How has your understanding of what it means to live well evolved?",
    "What assumption about how life works have you had to reconsider?",
    "What philosophical question do you find yourself returning to without resolution?",
    "What belief about existence have you questioned but never fully resolved?",
    "What mystery about life continues to intrigue you?",
];

const DEEP_GENERAL: &[&str] = &[
    "What moment revealed something important about yourself that you hadn't recognized?",
    "When did you realize you were becoming someone you hadn't expected to be?",
    "What connection with someone affected you in ways that only became clear much later?",
    "What influence from your past only revealed its impact years afterward?",
    "What relationship changed you in ways you didn't understand until much later?",
];

const VULNERABLE_SHADOW: &[&str] = &[
    "What contradiction within yourself have you learned to accept rather than reconcile?",
    "What part of yourself do you keep hidden from those closest to you?",
    "When did you realize you'd been pretending to be someone you're not?",
    "What aspect of yourself do you struggle to acknowledge even though you know it's true?",
    "What truth have you been running from that you know you'll eventually need to face?",
];

const VULNERABLE_WATERS: &[&str] = &[
    "What have you kept to yourself, uncertain of how it would be received?",
    "What did you lose without realizing its value until it was no longer there?",
    "What connection with someone changed you in ways you didn't recognize at the time?",
    "What influence from your past only became clear to you much later?",
    "What relationship taught you something about yourself that took years to understand?",
];

const VULNERABLE_GENERAL: &[&str] = &[
    "What achievement are you most proud of that would never appear on a CV?",
    "When did you first notice you were becoming someone unfamiliar to yourself?",
    "What seemingly insignificant decision altered the trajectory of your life?",
];

const SHADOWS: &[&str] = &[
    "What have you never told anyone because you're uncertain how it would be received?",
    "What truth about yourself have you been avoiding, and what might change if you embraced it fully?",
    "What connection with someone transformed you in ways you only recognized years afterward?",
    "What influence from your past only revealed its full impact much later?",
    "What relationship shaped you in ways that took years to fully comprehend?",
];

const EMPTY_POOL_GENTLE: &[&str] = &[
    "What moment from your past do you find yourself returning to in your thoughts?",
    "How has your understanding of yourself changed in ways that surprised you?",
    "What quality do you possess that you value most?",
];

const EMPTY_POOL_DEEP: &[&str] = &[
    "When did you discover you were mistaken about something you had been absolutely certain of?",
    "What assumption about yourself did you hold for years before realizing it was wrong?",
    "What certainty about your life did you have to let go of?",
    "What did you believe about yourself that turned out to be incorrect?",
    "What conviction did you hold that you later had to abandon?",
];

/// Used when every template collides with an existing card.
pub const FILTERED_FALLBACKS: &[&str] = &[
    "What moment from your life do you find yourself reflecting on most often?",
    "How has your perspective on what matters most evolved over time?",
    "What experience shaped you in ways you only understood later?",
    "When did you realize something important about yourself?",
    "What question about yourself have you been carrying for a while?",
    "What part of yourself do you understand better now than you did before?",
    "How has your relationship with yourself changed over the years?",
    "What insight about yourself came to you when you least expected it?",
];

/// Used when probing and rewriting both fail.
pub const LAST_RESORT: &[&str] = &[
    "What moment from your life do you find yourself reflecting on most often?",
    "How has your perspective on what matters most evolved over time?",
    "What experience shaped you in ways you only understood later?",
    "When did you realize something important about yourself?",
    "What question about yourself have you been carrying for a while?",
];

/// Template pool for a source card. Theme priority depends on the tier.
pub fn template_pool(card: &Card) -> &'static [&'static str] {
    let has = |theme| card.has_theme(theme);
    let pool = match card.intensity.level() {
        1 if has(ThemeTag::Nostalgia) => WARM_NOSTALGIA,
        1 if has(ThemeTag::Identity) => WARM_IDENTITY,
        1 => WARM_GENERAL,
        2 if has(ThemeTag::Identity) => PERSONAL_IDENTITY,
        2 if has(ThemeTag::Love) => PERSONAL_LOVE,
        2 if has(ThemeTag::Philosophy) => PERSONAL_PHILOSOPHY,
        2 => PERSONAL_GENERAL,
        3 if has(ThemeTag::Shadow) => DEEP_SHADOW,
        3 if has(ThemeTag::DeepWaters) => DEEP_WATERS,
        3 if has(ThemeTag::Philosophy) => DEEP_PHILOSOPHY,
        3 => DEEP_GENERAL,
        4 if has(ThemeTag::Shadow) => VULNERABLE_SHADOW,
        4 if has(ThemeTag::DeepWaters) => VULNERABLE_WATERS,
        4 => VULNERABLE_GENERAL,
        _ => SHADOWS,
    };
    if !pool.is_empty() {
        return pool;
    }
    if card.intensity.level() <= 2 {
        EMPTY_POOL_GENTLE
    } else {
        EMPTY_POOL_DEEP
    }
}
