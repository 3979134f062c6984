//! Named transform tasks.

use std::fmt;

/// A transform task runnable on its own or as part of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    VendorJs,
    Js,
    VendorCss,
    Css,
    Html,
    Images,
    Fonts,
    SvgSprite,
}

impl Task {
    /// Every task, in reporting order.
    pub const ALL: [Task; 8] = [
        Task::VendorJs,
        Task::Js,
        Task::VendorCss,
        Task::Css,
        Task::Html,
        Task::Images,
        Task::Fonts,
        Task::SvgSprite,
    ];

    /// Tasks run concurrently by a full build.
    ///
    /// The sprite is built on demand only.
    pub const BUILD: [Task; 7] = [
        Task::VendorJs,
        Task::Js,
        Task::VendorCss,
        Task::Css,
        Task::Html,
        Task::Images,
        Task::Fonts,
    ];

    /// Tasks re-run by the watcher.
    pub const WATCHED: [Task; 4] = [Task::Html, Task::Css, Task::Js, Task::Images];

    pub const fn name(self) -> &'static str {
        match self {
            Task::VendorJs => "vendor-js",
            Task::Js => "js",
            Task::VendorCss => "vendor-css",
            Task::Css => "css",
            Task::Html => "html",
            Task::Images => "images",
            Task::Fonts => "fonts",
            Task::SvgSprite => "svg-sprite",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_excludes_sprite() {
        assert!(!Task::BUILD.contains(&Task::SvgSprite));
        assert!(Task::BUILD.iter().all(|t| Task::ALL.contains(t)));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Task::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Task::ALL.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(Task::VendorCss.to_string(), "vendor-css");
        assert_eq!(Task::SvgSprite.to_string(), "svg-sprite");
    }
}
