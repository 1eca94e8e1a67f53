//! Per-command policy deciding which cascades run around the real command.

use anyhow::Result;
use fwg_core::{CommandKind, HookFamily, HookLocation, HookPoint};

use crate::cascade::HookFirer;

/// Arguments handed to every hook fired for one invocation:
/// the command token followed by everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookInvocation(Vec<String>);

impl HookInvocation {
    pub fn from_command(args: &[String], command_index: usize) -> Self {
        Self(args.get(command_index..).unwrap_or_default().to_vec())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Positional arguments after the command token.
    fn operands(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(|arg| !arg.starts_with('-'))
    }
}

/// Hooks to fire for one classified command.
#[derive(Debug, Clone)]
pub struct HookSet {
    family: HookFamily,
    invocation: HookInvocation,
    silent: bool,
}

impl HookSet {
    /// Build the hook set for `kind`. Unknown commands have none.
    pub fn for_command(kind: CommandKind, args: &[String], command_index: usize) -> Option<Self> {
        let family = kind.hook_family()?;
        let invocation = HookInvocation::from_command(args, command_index);
        let silent = declared_silence(family, &invocation);
        Some(Self {
            family,
            invocation,
            silent,
        })
    }

    pub fn family(&self) -> HookFamily {
        self.family
    }

    pub fn invocation(&self) -> &HookInvocation {
        &self.invocation
    }

    /// Whether hook and log output should stay off the console.
    pub fn silent(&self) -> bool {
        self.silent
    }

    pub async fn pre_command(&self, firer: &HookFirer) -> Result<i32> {
        self.fire_point(firer, HookPoint::pre(self.family)).await
    }

    pub async fn post_command(&self, firer: &HookFirer) -> Result<i32> {
        self.fire_point(firer, HookPoint::post(self.family)).await
    }

    /// Versioned hooks always get the full cascade. Native hooks get the
    /// reduced one when git runs the named script itself.
    async fn fire_point(&self, firer: &HookFirer, point: HookPoint) -> Result<i32> {
        let args = self.invocation.as_slice();
        let code = firer.fire_full(point, HookLocation::Versioned, args).await?;
        if code != 0 {
            return Ok(code);
        }
        if point.is_native() {
            firer.fire_reduced(point, HookLocation::Native, args).await
        } else {
            firer.fire_full(point, HookLocation::Native, args).await
        }
    }
}

/// `status` never talks; `branch`/`tag` only when they change something.
fn declared_silence(family: HookFamily, invocation: &HookInvocation) -> bool {
    match family {
        HookFamily::Status => true,
        HookFamily::Branch | HookFamily::Tag => invocation.operands().next().is_none(),
        _ => false,
    }
}
