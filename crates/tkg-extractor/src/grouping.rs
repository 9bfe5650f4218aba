//! Phrase grouping engine
//!
//! Three passes over a classified sentence:
//!
//! 1. [`group_sentence`] folds tokens into phrases with a small state
//!    machine ([`EngineState`]), one handler per role.
//! 2. [`merge_qualities`] attaches a Quality phrase to the Subject after it.
//! 3. [`connect_sentence`] collapses runs of phrases sharing a role.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use tkg_core::Speakers;

use crate::classifier::ClassifiedToken;
use crate::roles::{Role, RoleTable};

/// A multi-word unit with a single role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub text: String,
    pub role: Role,
}

impl Phrase {
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

impl std::fmt::Display for Phrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.text, self.role)
    }
}

/// Render phrases as `text (Role) ` pairs
pub fn render_phrases(phrases: &[Phrase]) -> String {
    phrases.iter().map(|p| format!("{p} ")).collect()
}

// ============================================================================
// Engine State
// ============================================================================

/// Accumulators threaded through the pass-1 handlers.
///
/// At most one of `subject` and `connector` is open after any handler that
/// starts from a state reachable through [`group_sentence`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    pub subject: Option<String>,
    pub connector: Option<String>,
    pub output: Vec<Phrase>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_subject(&mut self) {
        if let Some(text) = self.subject.take() {
            self.output.push(Phrase::new(text, Role::Subject));
        }
    }

    fn flush_connector(&mut self) {
        if let Some(text) = self.connector.take() {
            self.output.push(Phrase::new(text, Role::Connector));
        }
    }

    fn extend_subject(&mut self, word: &str) {
        match self.subject.as_mut() {
            Some(subject) => {
                subject.push(' ');
                subject.push_str(word);
            }
            None => self.subject = Some(word.to_string()),
        }
    }

    fn extend_connector(&mut self, word: &str) {
        if let Some(connector) = self.connector.as_mut() {
            connector.push('_');
            connector.push_str(word);
        }
    }

    fn emit(&mut self, text: impl Into<String>, role: Role) {
        self.output.push(Phrase::new(text, role));
    }

    /// Flush whatever is still open and return the phrases
    pub fn finish(mut self) -> Vec<Phrase> {
        self.flush_connector();
        self.flush_subject();
        self.output
    }
}

/// A token with its neighbours
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    pub token: &'a ClassifiedToken,
    pub prev: Option<&'a ClassifiedToken>,
    pub next: Option<&'a ClassifiedToken>,
}

impl<'a> TokenContext<'a> {
    pub fn at(tokens: &'a [ClassifiedToken], index: usize) -> Option<Self> {
        let token = tokens.get(index)?;
        Some(Self {
            token,
            prev: index.checked_sub(1).and_then(|i| tokens.get(i)),
            next: tokens.get(index + 1),
        })
    }

    fn word(&self) -> &'a str {
        &self.token.word
    }

    fn prev_role(&self) -> Option<Role> {
        self.prev.map(|t| t.role)
    }

    fn next_role(&self) -> Option<Role> {
        self.next.map(|t| t.role)
    }
}

/// Inputs that stay fixed for the whole sentence
#[derive(Debug, Clone, Copy)]
pub struct GroupingRules<'a> {
    pub table: &'a RoleTable,
    pub speakers: &'a Speakers,
}

// ============================================================================
// Pass 1
// ============================================================================

/// Group a classified sentence into phrases
pub fn group_sentence(
    tokens: &[ClassifiedToken],
    table: &RoleTable,
    speakers: &Speakers,
) -> Vec<Phrase> {
    let rules = GroupingRules { table, speakers };
    let mut state = EngineState::new();

    for index in 0..tokens.len() {
        if let Some(ctx) = TokenContext::at(tokens, index) {
            state = apply(state, &ctx, &rules);
        }
    }

    state.finish()
}

/// Dispatch one token to the handler for its role
pub fn apply(state: EngineState, ctx: &TokenContext<'_>, rules: &GroupingRules<'_>) -> EngineState {
    match ctx.token.role {
        Role::Subject => group_subject(state, ctx, rules),
        Role::Quality => group_quality(state, ctx),
        Role::Connector => group_connector(state, ctx),
        Role::Separator => group_separator(state, ctx),
        Role::Ignore => group_ignore(state, ctx),
        Role::Pronoun | Role::SelfPronoun | Role::SubjectPronoun => {
            group_pronoun(state, ctx, rules)
        }
        Role::MainSubject | Role::Other => state,
    }
}

pub fn group_subject(
    mut state: EngineState,
    ctx: &TokenContext<'_>,
    rules: &GroupingRules<'_>,
) -> EngineState {
    if rules.table.is_bad_subject(ctx.word()) {
        return state;
    }
    state.flush_connector();
    state.extend_subject(ctx.word());
    state
}

pub fn group_quality(mut state: EngineState, ctx: &TokenContext<'_>) -> EngineState {
    state.flush_connector();
    if ctx.prev_role() != Some(Role::Subject) {
        state.flush_subject();
    }

    match ctx.next {
        Some(next) if next.role == Role::Quality => {
            state.emit(format!("{} {}", ctx.word(), next.word), Role::Quality);
        }
        // Already emitted as the second word of a pair
        _ if ctx.prev_role() == Some(Role::Quality) => {}
        _ => state.emit(ctx.word(), Role::Quality),
    }
    state
}

pub fn group_connector(mut state: EngineState, ctx: &TokenContext<'_>) -> EngineState {
    state.flush_subject();
    if state.connector.is_some() {
        state.flush_connector();
        state.subject = Some(ctx.word().to_string());
    } else {
        state.connector = Some(ctx.word().to_string());
    }
    state
}

pub fn group_separator(mut state: EngineState, ctx: &TokenContext<'_>) -> EngineState {
    state.flush_connector();
    state.flush_subject();
    state.emit(ctx.word(), Role::Separator);
    state
}

pub fn group_ignore(mut state: EngineState, ctx: &TokenContext<'_>) -> EngineState {
    let word = ctx.word();
    let prev_role = ctx.prev_role();

    if prev_role == ctx.next_role() {
        if state.subject.is_some() {
            state.extend_subject(word);
        } else {
            state.extend_connector(word);
        }
    } else if prev_role == Some(Role::Subject) && state.subject.is_some() {
        state.extend_subject(word);
    } else if prev_role == Some(Role::Connector) && state.connector.is_some() {
        state.extend_connector(word);
    } else if prev_role == Some(Role::Quality) {
        if let Some(last) = state.output.last_mut() {
            if last.role == Role::Quality {
                last.text.push(' ');
                last.text.push_str(word);
            }
        }
    }
    state
}

pub fn group_pronoun(
    mut state: EngineState,
    ctx: &TokenContext<'_>,
    rules: &GroupingRules<'_>,
) -> EngineState {
    let person = match rules.table.role_for_word(ctx.word()) {
        Some(Role::SelfPronoun) => &rules.speakers.interviewer,
        Some(Role::SubjectPronoun) => &rules.speakers.interviewee,
        _ => {
            // Pronouns outside the lexical sets stand alone
            state.flush_connector();
            state.flush_subject();
            state.emit(rules.speakers.interviewer.clone(), Role::SubjectPronoun);
            return state;
        }
    };

    if state.subject.is_none() {
        state.flush_connector();
    }
    state.extend_subject(person);
    state
}

// ============================================================================
// Pass 2
// ============================================================================

/// Fold each Quality into the Subject that directly follows it
pub fn merge_qualities(phrases: &[Phrase]) -> Vec<Phrase> {
    let mut merged = Vec::with_capacity(phrases.len());

    for (i, phrase) in phrases.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|j| phrases.get(j));
        let next = phrases.get(i + 1);

        match (phrase.role, prev, next) {
            (Role::Subject, Some(prev), _) if prev.role == Role::Quality => {
                merged.push(Phrase::new(
                    format!("{} {}", prev.text, phrase.text),
                    Role::Subject,
                ));
            }
            (Role::Quality, _, Some(next)) if next.role == Role::Subject => {}
            _ => merged.push(phrase.clone()),
        }
    }

    merged
}

// ============================================================================
// Pass 3
// ============================================================================

/// Join consecutive phrases with the same role
pub fn connect_sentence(phrases: &[Phrase]) -> Vec<Phrase> {
    let mut connected: Vec<Phrase> = Vec::with_capacity(phrases.len());

    for phrase in phrases {
        match connected.last_mut() {
            Some(last) if last.role == phrase.role => {
                last.text.push(' ');
                last.text.push_str(&phrase.text);
            }
            _ => connected.push(phrase.clone()),
        }
    }

    connected
}

// ============================================================================
// Tests
// ============================================================================
