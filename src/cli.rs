use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::{Result as Res, eyre::eyre};

use crate::core::{
    model::component::{DirPath, Entry},
    msg::{LinkKind, OperationRequest},
};

#[derive(Parser)]
#[command(version, about, long_about = None,)]
pub struct Cli {
    /// Directory to operate in, defaults to the configured path or the cwd
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<String>,

    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Print the commands instead of running them
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Do not write log messages
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Use verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Answer yes to the force-delete prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    #[command(subcommand)]
    pub op: Op,
}

#[derive(Subcommand, Debug)]
pub enum Op {
    /// Remove entries recursively
    Delete {
        #[arg(required_unless_present = "current")]
        names: Vec<String>,
        /// remove the directory itself instead of entries in it
        #[arg(long = "self", conflicts_with = "names")]
        current: bool,
    },
    /// Rename an entry, or the directory itself when --entry is omitted
    Rename {
        #[arg(long)]
        entry: Option<String>,
        new_name: String,
    },
    /// Create a directory
    Mkdir { name: String },
    /// Link to a sibling entry
    Link {
        original: String,
        name: String,
        #[arg(short, long)]
        symbolic: bool,
    },
    /// Change mode and/or ownership of an entry
    Chmod {
        name: String,
        /// octal, e.g. 755
        #[arg(long, value_parser = parse_octal)]
        mode: Option<u32>,
        #[arg(long, requires = "group")]
        owner: Option<String>,
        #[arg(long, requires = "owner")]
        group: Option<String>,
    },
    /// Copy (or symlink) sources into a directory in the background
    Paste {
        #[arg(required = true)]
        sources: Vec<String>,
        /// target directory, defaults to the current one
        #[arg(long)]
        into: Option<String>,
        #[arg(short, long)]
        symlink: bool,
    },
}

fn parse_octal(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0o"), 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("'{s}' is not an octal mode"))
}

impl Cli {
    /// `EnvFilter` directive for this invocation
    pub fn log_filter(&self, configured: &str) -> String {
        if self.quiet {
            "off".into()
        } else if self.debug >= 2 {
            "trace".into()
        } else if self.debug == 1 || self.verbose {
            "debug".into()
        } else {
            configured.into()
        }
    }
}

impl Op {
    pub fn into_request(self, path: &DirPath) -> Res<OperationRequest> {
        let request = match self {
            // names are required unless --self, so empty means the directory
            Op::Delete { names, .. } => OperationRequest::Delete {
                path: path.clone(),
                selection: names.into_iter().map(Entry::named).collect(),
            },
            Op::Rename { entry, new_name } => OperationRequest::Rename {
                path: path.clone(),
                target: match entry {
                    Some(name) => Entry::named(name),
                    None => Entry::current_dir(path.last(), count_items(&path.join())),
                },
                name: new_name,
            },
            Op::Mkdir { name } => OperationRequest::CreateDirectory {
                path: path.clone(),
                name,
            },
            Op::Link {
                original,
                name,
                symbolic,
            } => OperationRequest::CreateLink {
                path: path.clone(),
                kind: if symbolic {
                    LinkKind::Symbolic
                } else {
                    LinkKind::Hard
                },
                original,
                name,
            },
            Op::Chmod {
                name,
                mode,
                owner,
                group,
            } => {
                if mode.is_none() && owner.is_none() {
                    return Err(eyre!("chmod needs --mode and/or --owner/--group"));
                }
                // unspecified parts are given as unchanged
                let mut entry = Entry::named(&name);
                entry.mode = match mode {
                    Some(_) => current_mode(&Path::new(&path.join()).join(&name)),
                    None => Some(0),
                };
                if owner.is_none() {
                    entry.owner = Some(String::new());
                    entry.group = Some(String::new());
                }
                OperationRequest::EditPermissions {
                    path: path.clone(),
                    entry,
                    mode: mode.unwrap_or(0),
                    owner: owner.unwrap_or_default(),
                    group: group.unwrap_or_default(),
                }
            }
            Op::Paste {
                sources,
                into,
                symlink,
            } => OperationRequest::Paste {
                sources,
                target: into.unwrap_or_else(|| path.join()),
                as_symlink: symlink,
            },
        };
        Ok(request)
    }
}

fn count_items(dir: &str) -> usize {
    std::fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
}

#[cfg(unix)]
fn current_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::symlink_metadata(path)
        .ok()
        .map(|meta| meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn current_mode(_path: &Path) -> Option<u32> {
    None
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ef-fop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal("755"), Ok(0o755));
        assert_eq!(parse_octal("0o644"), Ok(0o644));
        assert!(parse_octal("9").is_err());
        assert!(parse_octal("17777").is_err());
    }

    #[test]
    fn test_delete_names_become_selection() {
        let cli = parse(&["-p", "/srv", "delete", "a", "b"]);
        let req = cli.op.into_request(&DirPath::parse("/srv")).unwrap();
        match req {
            OperationRequest::Delete { selection, .. } => {
                assert_eq!(selection, vec![Entry::named("a"), Entry::named("b")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_delete_needs_names_or_self() {
        assert!(Cli::try_parse_from(["ef-fop", "delete"]).is_err());
        assert!(Cli::try_parse_from(["ef-fop", "delete", "a", "--self"]).is_err());

        let cli = parse(&["delete", "--self"]);
        let req = cli.op.into_request(&DirPath::parse("/srv/old")).unwrap();
        match req {
            OperationRequest::Delete { path, selection } => {
                assert_eq!(path.join(), "/srv/old");
                assert!(selection.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_owner_requires_group() {
        let args = ["ef-fop", "chmod", "f", "--owner", "bob"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_chmod_owner_only_keeps_mode() {
        let cli = parse(&["chmod", "f", "--owner", "bob", "--group", "staff"]);
        let req = cli.op.into_request(&DirPath::parse("/srv")).unwrap();
        match req {
            OperationRequest::EditPermissions {
                entry, mode, owner, ..
            } => {
                assert_eq!(entry.mode, Some(mode));
                assert_eq!(owner, "bob");
                assert_eq!(entry.owner, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(parse(&["-q", "mkdir", "x"]).log_filter("info"), "off");
        assert_eq!(parse(&["-dd", "mkdir", "x"]).log_filter("info"), "trace");
        assert_eq!(parse(&["mkdir", "x"]).log_filter("warn"), "warn");
    }
}
