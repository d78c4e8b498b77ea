//! Configuration file parsing and the boot option store.
//!
//! The configuration is plain line-oriented `key=value` text with no
//! comments, quoting, or nesting. Recognized keys are `entry`, `family`,
//! `kernel`, `initrd`, and `root`; anything else is reported and skipped.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use log::warn;

use crate::distros;

/// Scans configuration text and yields key/value pairs in document order.
///
/// Keys and values are trimmed and copied out, so they stay usable after
/// the raw file buffer is released. Blank lines and lines without a `=`
/// separator are skipped; unknown keys are the builder's problem, not ours.
pub struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = (String, String);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let line = match self.rest.find('\n') {
                Some(end) => {
                    let line = &self.rest[..end];
                    self.rest = &self.rest[end + 1..];
                    line
                }
                // Last line without a trailing newline.
                None => core::mem::take(&mut self.rest),
            };

            if let Some((key, value)) = line.split_once('=') {
                return Some((key.trim().to_string(), value.trim().to_string()));
            }
        }
        None
    }
}

/// One bootable distribution the operator can choose.
///
/// `kernel_path`, `initrd_path`, and `boot_folder` are filled from the
/// family table first and overwritten by explicit `kernel`/`initrd`/`root`
/// directives; the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootOption {
    pub name: String,
    pub family: Option<String>,
    pub kernel_path: String,
    pub initrd_path: String,
    pub boot_folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file parsed but described nothing bootable.
    NoEntries,
    /// A `family` value has no entry in the distribution table.
    UnsupportedFamily(String),
    /// A per-entry directive appeared before the first `entry`.
    DirectiveBeforeEntry(String),
    /// An entry ended up without a kernel or initrd path.
    IncompleteEntry(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEntries => f.write_str("configuration file contains no boot entries"),
            Self::UnsupportedFamily(family) => {
                write!(f, "distribution family {family} is not supported")
            }
            Self::DirectiveBeforeEntry(key) => {
                write!(f, "{key} directive appears before any entry")
            }
            Self::IncompleteEntry(name) => {
                write!(f, "entry {name} is missing a kernel or initrd path")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// The ordered set of boot options described by one configuration file.
///
/// Built in a single pass and only handed out whole: a file containing any
/// unusable entry yields an error instead of a partial store, so every
/// index a caller can see refers to a bootable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOptions {
    entries: Vec<BootOption>,
}

impl BootOptions {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut entries: Vec<BootOption> = Vec::new();

        for (key, value) in Tokenizer::new(text) {
            match key.as_str() {
                "entry" => entries.push(BootOption {
                    name: value,
                    ..BootOption::default()
                }),
                "family" => {
                    let option = active(&mut entries, &key)?;
                    let distro = distros::lookup(&value)
                        .ok_or_else(|| ConfigError::UnsupportedFamily(value.clone()))?;
                    option.family = Some(value);
                    option.kernel_path = distro.kernel_path.to_string();
                    option.initrd_path = distro.initrd_path.to_string();
                    option.boot_folder = distro.boot_folder.to_string();
                }
                "kernel" => active(&mut entries, &key)?.kernel_path = value,
                "initrd" => active(&mut entries, &key)?.initrd_path = value,
                "root" => active(&mut entries, &key)?.boot_folder = value,
                _ => warn!("unrecognized configuration option: {key}"),
            }
        }

        if entries.is_empty() {
            return Err(ConfigError::NoEntries);
        }
        if let Some(option) = entries
            .iter()
            .find(|option| option.kernel_path.is_empty() || option.initrd_path.is_empty())
        {
            return Err(ConfigError::IncompleteEntry(option.name.clone()));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BootOption> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, BootOption> {
        self.entries.iter()
    }
}

fn active<'a>(
    entries: &'a mut Vec<BootOption>,
    key: &str,
) -> Result<&'a mut BootOption, ConfigError> {
    entries
        .last_mut()
        .ok_or_else(|| ConfigError::DirectiveBeforeEntry(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str =
        "entry=A\nkernel=/a/vmlinuz\ninitrd=/a/initrd.img\nroot=/a\nentry=B\nfamily=ubuntu\n";

    #[test]
    fn tokenizer_yields_trimmed_pairs_in_order() {
        let pairs: Vec<(String, String)> =
            Tokenizer::new("  entry = Alpha  \n\nfamily=ubuntu").collect();
        assert_eq!(
            pairs,
            vec![
                ("entry".to_string(), "Alpha".to_string()),
                ("family".to_string(), "ubuntu".to_string()),
            ]
        );
    }

    #[test]
    fn tokenizer_skips_lines_without_separator() {
        let pairs: Vec<(String, String)> =
            Tokenizer::new("no separator here\nkernel=/vmlinuz\n\n").collect();
        assert_eq!(pairs, vec![("kernel".to_string(), "/vmlinuz".to_string())]);
    }

    #[test]
    fn tokenizer_handles_missing_trailing_newline() {
        let pairs: Vec<(String, String)> = Tokenizer::new("entry=Last").collect();
        assert_eq!(pairs, vec![("entry".to_string(), "Last".to_string())]);
    }

    #[test]
    fn parse_builds_one_option_per_entry_in_file_order() {
        let options = BootOptions::parse(MIXED).unwrap();
        assert_eq!(options.len(), 2);

        let first = options.get(0).unwrap();
        assert_eq!(first.name, "A");
        assert_eq!(first.family, None);
        assert_eq!(first.kernel_path, "/a/vmlinuz");
        assert_eq!(first.initrd_path, "/a/initrd.img");
        assert_eq!(first.boot_folder, "/a");

        let second = options.get(1).unwrap();
        assert_eq!(second.name, "B");
        assert_eq!(second.family.as_deref(), Some("ubuntu"));
        assert_eq!(second.kernel_path, "/casper/vmlinuz");
        assert_eq!(second.initrd_path, "/casper/initrd.lz");
        assert_eq!(second.boot_folder, "/casper");
    }

    #[test]
    fn manual_override_after_family_wins() {
        let options =
            BootOptions::parse("entry=X\nfamily=ubuntu\nkernel=/custom/vmlinuz\n").unwrap();
        let option = options.get(0).unwrap();
        assert_eq!(option.kernel_path, "/custom/vmlinuz");
        assert_eq!(option.initrd_path, "/casper/initrd.lz");
        assert_eq!(option.boot_folder, "/casper");
    }

    #[test]
    fn unknown_family_fails_the_whole_build() {
        let result =
            BootOptions::parse("entry=Good\nfamily=ubuntu\nentry=Test\nfamily=unknownos\n");
        assert_eq!(
            result,
            Err(ConfigError::UnsupportedFamily("unknownos".to_string()))
        );
    }

    #[test]
    fn unsupported_family_message_names_the_family() {
        let err = BootOptions::parse("entry=Test\nfamily=unknownos\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "distribution family unknownos is not supported"
        );
    }

    #[test]
    fn directive_before_any_entry_is_an_error() {
        assert_eq!(
            BootOptions::parse("kernel=/vmlinuz\nentry=Late\n"),
            Err(ConfigError::DirectiveBeforeEntry("kernel".to_string()))
        );
    }

    #[test]
    fn empty_or_noise_only_input_is_an_error() {
        assert_eq!(BootOptions::parse(""), Err(ConfigError::NoEntries));
        assert_eq!(
            BootOptions::parse("nothing to see\n\n"),
            Err(ConfigError::NoEntries)
        );
    }

    #[test]
    fn entry_without_paths_is_an_error() {
        assert_eq!(
            BootOptions::parse("entry=OnlyName\n"),
            Err(ConfigError::IncompleteEntry("OnlyName".to_string()))
        );
        assert_eq!(
            BootOptions::parse("entry=NoInitrd\nkernel=/vmlinuz\n"),
            Err(ConfigError::IncompleteEntry("NoInitrd".to_string()))
        );
    }

    #[test]
    fn parsing_the_same_input_twice_yields_identical_stores() {
        let first = BootOptions::parse(MIXED).unwrap();
        let second = BootOptions::parse(MIXED).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unrecognized_keys_are_reported_but_not_fatal() {
        let options = BootOptions::parse("entry=A\nfamily=debian\ncolor=blue\n").unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options.get(0).unwrap().kernel_path, "/live/vmlinuz");
    }
}
