/// Git subcommand recognized by the wrapper.
///
/// Derived once per invocation from the raw argument list. Anything outside
/// the known set classifies as [`CommandKind::Unknown`], which is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Checkout,
    Rebase,
    Reset,
    CommitMsg,
    Commit,
    Status,
    CherryPick,
    Merge,
    Pull,
    Branch,
    Tag,
    Push,
    Unknown,
}

impl CommandKind {
    pub const KNOWN: [CommandKind; 12] = [
        Self::Checkout,
        Self::Rebase,
        Self::Reset,
        Self::CommitMsg,
        Self::Commit,
        Self::Status,
        Self::CherryPick,
        Self::Merge,
        Self::Pull,
        Self::Branch,
        Self::Tag,
        Self::Push,
    ];

    /// Exact-match a command token. Unmapped input yields `Unknown`.
    pub fn from_token(token: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.as_str() == token)
            .unwrap_or(Self::Unknown)
    }

    /// Returns the command-line token for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Rebase => "rebase",
            Self::Reset => "reset",
            Self::CommitMsg => "commit-msg",
            Self::Commit => "commit",
            Self::Status => "status",
            Self::CherryPick => "cherry-pick",
            Self::Merge => "merge",
            Self::Pull => "pull",
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Push => "push",
            Self::Unknown => "unknown",
        }
    }

    /// Hook family fired around this command, if any.
    pub fn hook_family(&self) -> Option<HookFamily> {
        let family = match self {
            Self::Checkout => HookFamily::Checkout,
            Self::Rebase => HookFamily::Rebase,
            Self::Reset => HookFamily::Reset,
            Self::CommitMsg => HookFamily::CommitMsg,
            Self::Commit => HookFamily::Commit,
            Self::Status => HookFamily::Status,
            Self::CherryPick => HookFamily::CherryPick,
            Self::Merge => HookFamily::Merge,
            Self::Pull => HookFamily::Pull,
            Self::Branch => HookFamily::Branch,
            Self::Tag => HookFamily::Tag,
            Self::Push => HookFamily::Push,
            Self::Unknown => return None,
        };
        Some(family)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a hook fires before or after the real command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookTiming {
    Pre,
    Post,
}

impl HookTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }
}

/// Command family a hook point belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookFamily {
    Checkout,
    Rebase,
    Reset,
    CommitMsg,
    Commit,
    Status,
    CherryPick,
    Merge,
    Pull,
    Branch,
    Tag,
    Push,
}

impl HookFamily {
    pub const ALL: [HookFamily; 12] = [
        Self::Checkout,
        Self::Rebase,
        Self::Reset,
        Self::CommitMsg,
        Self::Commit,
        Self::Status,
        Self::CherryPick,
        Self::Merge,
        Self::Pull,
        Self::Branch,
        Self::Tag,
        Self::Push,
    ];

    /// Command token handed to unnamed executables alongside the hook name.
    pub fn command_token(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Rebase => "rebase",
            Self::Reset => "reset",
            Self::CommitMsg => "commit-msg",
            Self::Commit => "commit",
            Self::Status => "status",
            Self::CherryPick => "cherry-pick",
            Self::Merge => "merge",
            Self::Pull => "pull",
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Push => "push",
        }
    }
}

/// A (timing, family) pair identifying one place hooks can fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookPoint {
    pub timing: HookTiming,
    pub family: HookFamily,
}

impl HookPoint {
    pub fn new(timing: HookTiming, family: HookFamily) -> Self {
        Self { timing, family }
    }

    pub fn pre(family: HookFamily) -> Self {
        Self::new(HookTiming::Pre, family)
    }

    pub fn post(family: HookFamily) -> Self {
        Self::new(HookTiming::Post, family)
    }

    /// Every hook point the wrapper knows about.
    pub fn all() -> impl Iterator<Item = HookPoint> {
        HookFamily::ALL
            .into_iter()
            .flat_map(|family| [Self::pre(family), Self::post(family)])
    }

    /// Canonical file name a named hook must carry, e.g. `pre-commit`.
    ///
    /// The pre-timed commit message hook keeps git's own spelling,
    /// `commit-msg`.
    pub fn hook_name(&self) -> String {
        match (self.timing, self.family) {
            (HookTiming::Pre, HookFamily::CommitMsg) => "commit-msg".to_string(),
            (timing, family) => format!("{}-{}", timing.as_str(), family.command_token()),
        }
    }

    /// Token passed as the first argument to unnamed executables so they can
    /// tell which hook point fired them.
    pub fn invocation_token(&self) -> String {
        self.hook_name()
    }

    /// Whether git itself runs a script named [`Self::hook_name`] from its own
    /// hook folder when the wrapped command executes.
    pub fn is_native(&self) -> bool {
        matches!(
            (self.timing, self.family),
            (HookTiming::Pre, HookFamily::Commit)
                | (HookTiming::Post, HookFamily::Commit)
                | (HookTiming::Pre, HookFamily::CommitMsg)
                | (HookTiming::Pre, HookFamily::Push)
        )
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hook_name())
    }
}

/// Root folder a cascade searches for hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookLocation {
    /// Git's own hook folder (`.git/hooks`), not tracked by version control.
    Native,
    /// Project-tracked hook folder that travels with the repository source.
    Versioned,
}

impl std::fmt::Display for HookLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "Native"),
            Self::Versioned => write!(f, "Versioned"),
        }
    }
}
