//! Toast message types
//!
//! A `ToastDraft` is what producers hand to the store; the store turns it into a
//! tracked `ToastMessage` with an id, an effective duration, and `open = true`.

use std::fmt;
use std::time::Duration;

/// Severity of a toast, which drives its default title and color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl ToastKind {
    /// Title used when the producer does not supply one
    pub fn default_title(self) -> &'static str {
        match self {
            ToastKind::Success => "Succès",
            ToastKind::Error => "Erreur",
            ToastKind::Info => "Information",
            ToastKind::Warning => "Attention",
        }
    }
}

/// Identifier of a tracked toast, unique among the messages currently in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(String);

impl ToastId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToastId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ToastId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A message tracked by the toast store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    /// Unique identifier
    pub id: ToastId,
    /// Severity
    pub kind: ToastKind,
    /// Headline shown to the user
    pub title: String,
    /// Optional body text
    pub description: Option<String>,
    /// Time before auto-dismissal; zero means the toast stays until dismissed
    pub duration: Duration,
    /// Whether the toast is visible; hidden toasts are waiting to be removed
    pub open: bool,
}

impl ToastMessage {
    /// Whether this toast will never be dismissed by a timer
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }
}

/// A toast to be added to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastDraft {
    /// Explicit id; generated by the store when `None`
    pub id: Option<ToastId>,
    pub kind: ToastKind,
    /// Headline; defaults to the kind's title when `None`
    pub title: Option<String>,
    pub description: Option<String>,
    /// `None` uses the store's default duration, `Some(Duration::ZERO)` never auto-dismisses
    pub duration: Option<Duration>,
}

impl ToastDraft {
    pub fn new(kind: ToastKind) -> Self {
        Self {
            id: None,
            kind,
            title: None,
            description: None,
            duration: None,
        }
    }

    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Keeps the toast on screen until it is dismissed explicitly
    pub fn persistent(self) -> Self {
        self.duration(Duration::ZERO)
    }
}

/// Options accepted by the `success`/`error`/`info`/`warning` producers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastOptions {
    pub title: Option<String>,
    pub duration: Option<Duration>,
    pub id: Option<ToastId>,
}

impl ToastOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// In-place changes applied by `ToastAction::Update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastPatch {
    pub kind: Option<ToastKind>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ToastPatch {
    pub(crate) fn apply(self, message: &mut ToastMessage) {
        if let Some(kind) = self.kind {
            message.kind = kind;
        }
        if let Some(title) = self.title {
            message.title = title;
        }
        if let Some(description) = self.description {
            message.description = Some(description);
        }
    }
}
