use std::fmt;

use serde::{Deserialize, Serialize};

/// How the spawner turns a failed process into a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrMode {
    /// stderr becomes the failure message
    #[default]
    Message,
    /// stderr is dropped, the message only names the exit status
    Ignore,
    /// stdout and stderr are both folded into the message
    Out,
}

/// Privilege elevation for one command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Superuser {
    #[default]
    None,
    /// elevate if possible, otherwise run as the current user
    Try,
    Require,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecOptions {
    pub err: ErrMode,
    pub superuser: Superuser,
}

impl ExecOptions {
    /// `{err: "message", superuser: "try"}`, used by every modal operation
    pub fn privileged() -> Self {
        Self {
            err: ErrMode::Message,
            superuser: Superuser::Try,
        }
    }

    /// what background pastes run with
    pub fn plain() -> Self {
        Self::default()
    }
}

/// One external program invocation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    program: String,
    args: Vec<String>,
    options: ExecOptions,
}

impl CommandDescriptor {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        options: ExecOptions,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            options,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> ExecOptions {
        self.options
    }

    /// program followed by its arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program())
            .chain(self.args().iter().map(String::as_str))
            .collect()
    }

    // --- builders ---

    pub fn remove_recursive(targets: Vec<String>, options: ExecOptions) -> Self {
        Self::new("rm", std::iter::once("-r".to_string()).chain(targets), options)
    }

    pub fn rename(from: String, to: String, options: ExecOptions) -> Self {
        Self::new("mv", [from, to], options)
    }

    pub fn make_dir(path: String, options: ExecOptions) -> Self {
        Self::new("mkdir", [path], options)
    }

    pub fn link(symbolic: bool, source: String, dest: String, options: ExecOptions) -> Self {
        let mut args = Vec::with_capacity(3);
        if symbolic {
            args.push("-s".to_string());
        }
        args.push(source);
        args.push(dest);
        Self::new("ln", args, options)
    }

    pub fn change_mode(mode: u32, path: String, options: ExecOptions) -> Self {
        Self::new("chmod", [format!("{mode:o}"), path], options)
    }

    pub fn change_owner(owner: &str, group: &str, path: String, options: ExecOptions) -> Self {
        Self::new("chown", [format!("{owner}:{group}"), path], options)
    }

    pub fn symlink_into(sources: Vec<String>, target: String, options: ExecOptions) -> Self {
        let args = std::iter::once("-s".to_string())
            .chain(sources)
            .chain(std::iter::once(target));
        Self::new("ln", args, options)
    }

    pub fn copy_into(sources: Vec<String>, target: String, options: ExecOptions) -> Self {
        let args = std::iter::once("-R".to_string())
            .chain(sources)
            .chain(std::iter::once(target));
        Self::new("cp", args, options)
    }
}

impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_chmod_renders_octal() {
        let cmd = CommandDescriptor::change_mode(0o755, "/srv/a".into(), ExecOptions::plain());
        assert_eq!(cmd.argv(), vec!["chmod", "755", "/srv/a"]);
    }

    #[test]
    fn test_link_flag_only_when_symbolic() {
        let hard = CommandDescriptor::link(false, "a".into(), "b".into(), ExecOptions::plain());
        let soft = CommandDescriptor::link(true, "a".into(), "b".into(), ExecOptions::plain());
        assert_eq!(hard.args(), ["a", "b"]);
        assert_eq!(soft.args(), ["-s", "a", "b"]);
    }

    #[test]
    fn test_paste_puts_target_last() {
        let cmd = CommandDescriptor::copy_into(
            vec!["/a".into(), "/b".into()],
            "/dst".into(),
            ExecOptions::plain(),
        );
        assert_eq!(cmd.to_string(), "cp -R /a /b /dst");
    }

    #[test]
    fn test_default_options_deserialize() {
        let opts: ExecOptions = toml::from_str("err = \"ignore\"\nsuperuser = \"require\"").unwrap();
        assert_eq!(opts.err, ErrMode::Ignore);
        assert_eq!(opts.superuser, Superuser::Require);
    }
}
