//! Built-in table of known distribution families.
//!
//! Maps a family identifier to the default locations of its boot artifacts
//! inside the live ISO. The kernel, initrd, and boot folder come from one
//! table row, so the three can never disagree for a given family.

/// Default boot artifact locations for one distribution family.
pub struct Distribution {
    pub family: &'static str,
    pub kernel_path: &'static str,
    pub initrd_path: &'static str,
    pub boot_folder: &'static str,
}

/// Ubuntu derivatives ship a casper layout; Debian and its live spins use
/// live-boot. Families not listed here need explicit `kernel`/`initrd`
/// directives in the configuration file.
pub const DISTRIBUTIONS: &[Distribution] = &[
    Distribution {
        family: "ubuntu",
        kernel_path: "/casper/vmlinuz",
        initrd_path: "/casper/initrd.lz",
        boot_folder: "/casper",
    },
    Distribution {
        family: "debian",
        kernel_path: "/live/vmlinuz",
        initrd_path: "/live/initrd.img",
        boot_folder: "/live",
    },
    Distribution {
        family: "kali",
        kernel_path: "/live/vmlinuz",
        initrd_path: "/live/initrd.img",
        boot_folder: "/live",
    },
    Distribution {
        family: "tails",
        kernel_path: "/live/vmlinuz",
        initrd_path: "/live/initrd.img",
        boot_folder: "/live",
    },
];

/// Looks up a family by exact name. A miss is an expected outcome, not an
/// error; it only becomes one when the caller needs non-empty paths.
pub fn lookup(family: &str) -> Option<&'static Distribution> {
    DISTRIBUTIONS.iter().find(|distro| distro.family == family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_the_matching_row() {
        let distro = lookup("ubuntu").unwrap();
        assert_eq!(distro.kernel_path, "/casper/vmlinuz");
        assert_eq!(distro.initrd_path, "/casper/initrd.lz");
        assert_eq!(distro.boot_folder, "/casper");
    }

    #[test]
    fn lookup_misses_unknown_families() {
        assert!(lookup("unknownos").is_none());
        assert!(lookup("Ubuntu").is_none());
    }

    #[test]
    fn every_row_is_fully_specified() {
        for distro in DISTRIBUTIONS {
            assert!(!distro.family.is_empty());
            assert!(!distro.kernel_path.is_empty());
            assert!(!distro.initrd_path.is_empty());
            assert!(!distro.boot_folder.is_empty());
            assert!(distro.kernel_path.starts_with(distro.boot_folder));
            assert!(distro.initrd_path.starts_with(distro.boot_folder));
        }
    }
}
