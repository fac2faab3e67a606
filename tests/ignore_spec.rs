use std::fs;
use std::path::Path;

use rover::ignore::{find_ignore_file, is_ignored, IgnoreError, IgnoreMatcher};
use speculate2::speculate;

/// Unusual enough that no directory above the temp dir has one.
const RULES: &str = ".rover-test-ignore";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(path, content).expect("Failed to write file");
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().canonicalize().expect("Failed to canonicalize");
    }

    describe "find_ignore_file" {
        it "returns None when no directory has one" {
            fs::create_dir_all(root.join("a/b")).unwrap();
            assert_eq!(find_ignore_file(&root.join("a/b"), RULES), None);
        }

        it "finds a file in the start directory" {
            write(&root.join(RULES), "*.tmp\n");
            assert_eq!(find_ignore_file(&root, RULES), Some(root.join(RULES)));
        }

        it "prefers the nearest file when climbing" {
            write(&root.join(RULES), "*.tmp\n");
            write(&root.join("sub").join(RULES), "*.log\n");
            fs::create_dir_all(root.join("sub/deep")).unwrap();

            assert_eq!(
                find_ignore_file(&root.join("sub/deep"), RULES),
                Some(root.join("sub").join(RULES))
            );
            assert_eq!(find_ignore_file(&root.join("other"), RULES), Some(root.join(RULES)));
        }

        it "ignores directories with the rule file's name" {
            fs::create_dir_all(root.join(RULES)).unwrap();
            assert_eq!(find_ignore_file(&root, RULES), None);
        }
    }

    describe "is_ignored" {
        it "matches the nearest file's patterns" {
            let rules = root.join(RULES);
            write(&rules, "# scratch files\n\n*.tmp\n");

            assert!(is_ignored(&root.join("b.tmp"), &rules).unwrap());
            assert!(is_ignored(&root.join("nested/b.tmp"), &rules).unwrap());
            assert!(!is_ignored(&root.join("b.go"), &rules).unwrap());
        }

        it "treats an unreadable ignore file as an error" {
            let result = is_ignored(&root.join("b.tmp"), &root.join(RULES));
            assert!(matches!(result, Err(IgnoreError::Read { .. })));
        }
    }

    describe "ignore_matcher" {
        it "only consults the nearest file" {
            write(&root.join(RULES), "*.go\n");
            write(&root.join("sub").join(RULES), "*.tmp\n");
            let mut matcher = IgnoreMatcher::new(RULES);

            // The nested file shadows the top-level rules entirely.
            assert!(matcher.check(&root.join("sub/a.go")).unwrap().is_none());
            assert!(matcher.check(&root.join("sub/a.tmp")).unwrap().is_some());
            assert!(matcher.check(&root.join("a.go")).unwrap().is_some());
        }

        it "reports the matching rule and file" {
            write(&root.join(RULES), "*.log\n*.tmp\n");
            let mut matcher = IgnoreMatcher::new(RULES);

            let found = matcher.check(&root.join("b.tmp")).unwrap().expect("should be ignored");
            assert_eq!(found.rule_file, root.join(RULES));
            assert_eq!(found.pattern, "*.tmp");
        }

        it "reuses parsed rules for the rest of its life" {
            write(&root.join(RULES), "*.tmp\n");
            let mut matcher = IgnoreMatcher::new(RULES);
            assert!(matcher.check(&root.join("a.tmp")).unwrap().is_some());

            fs::write(root.join(RULES), "*.log\n").unwrap();
            assert!(matcher.check(&root.join("b.tmp")).unwrap().is_some());
            assert!(IgnoreMatcher::new(RULES).check(&root.join("b.tmp")).unwrap().is_none());
        }

        it "surfaces invalid patterns" {
            write(&root.join(RULES), "[oops\n");
            let mut matcher = IgnoreMatcher::new(RULES);
            let result = matcher.check(&root.join("a.go"));
            assert!(matches!(result, Err(IgnoreError::Pattern { .. })));
        }
    }
}
