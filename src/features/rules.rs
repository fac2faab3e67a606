//! Line patterns for structural categories.
//!
//! Every category has one regex, applied to each line independently. Only
//! the first match on a line counts. The patterns target Go-style syntax.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*import\s+\(\s*"([^"]+)"\s*\)"#).unwrap());
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//(.*)|^\s*/\*([^*]*\*/)").unwrap());
static STRUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*type\s+([a-zA-Z_]\w*)\s+struct\s*\{").unwrap());
static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+([a-zA-Z_]\w*)\s+([a-zA-Z_]\w*)").unwrap());
static CONST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const\s+([a-zA-Z_]\w*)\s+([a-zA-Z_]\w*)").unwrap());
static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"type\s+([a-zA-Z_]\w*)\s+interface\s*\{").unwrap());
static CHANNEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(make\()?(chan<-[^\s]*)").unwrap());
static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^package\s+([a-zA-Z_]\w*)").unwrap());
static ERROR_HANDLING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+),\s*(\w+)\s*:=\s*(\w+)\(.*\)").unwrap());
static TYPE_ASSERTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z_]\w*)\s*:=\s*\(([^)]+)\)").unwrap());
static CONTROL_FLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(if|else|switch|case|default|select)\s*\{").unwrap());
static DEFER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"defer\s+([a-zA-Z_]\w*)\(").unwrap());
static PANIC_RECOVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(panic|recover)\(.*\)").unwrap());
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s+\(([a-zA-Z_]\w*)\s*\*?([a-zA-Z_]\w*)\)\s*([a-zA-Z_]\w*)\(").unwrap()
});
static FUNCTION_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z_]\w*)\(").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Imports,
    Comments,
    Structs,
    Variables,
    Constants,
    Interfaces,
    Channels,
    PackageName,
    ErrorHandling,
    TypeAssertions,
    ControlFlow,
    DeferStatements,
    PanicRecover,
    Methods,
    FunctionCalls,
}

impl Category {
    /// Order in which rules are tried on each line.
    pub const SCAN_ORDER: [Category; 15] = [
        Self::Imports,
        Self::Comments,
        Self::Structs,
        Self::Variables,
        Self::Constants,
        Self::Interfaces,
        Self::Channels,
        Self::PackageName,
        Self::ErrorHandling,
        Self::TypeAssertions,
        Self::ControlFlow,
        Self::DeferStatements,
        Self::PanicRecover,
        Self::Methods,
        Self::FunctionCalls,
    ];

    /// Key used in the serialized record.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::Comments => "comments",
            Self::Structs => "structs",
            Self::Variables => "variables",
            Self::Constants => "constants",
            Self::Interfaces => "interfaces",
            Self::Channels => "channels",
            Self::PackageName => "packageName",
            Self::ErrorHandling => "errorHandling",
            Self::TypeAssertions => "typeAssertions",
            Self::ControlFlow => "controlFlow",
            Self::DeferStatements => "deferStatements",
            Self::PanicRecover => "panicRecover",
            Self::Methods => "methods",
            Self::FunctionCalls => "functionCalls",
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            Self::Imports => &IMPORT_RE,
            Self::Comments => &COMMENT_RE,
            Self::Structs => &STRUCT_RE,
            Self::Variables => &VAR_RE,
            Self::Constants => &CONST_RE,
            Self::Interfaces => &INTERFACE_RE,
            Self::Channels => &CHANNEL_RE,
            Self::PackageName => &PACKAGE_RE,
            Self::ErrorHandling => &ERROR_HANDLING_RE,
            Self::TypeAssertions => &TYPE_ASSERTION_RE,
            Self::ControlFlow => &CONTROL_FLOW_RE,
            Self::DeferStatements => &DEFER_RE,
            Self::PanicRecover => &PANIC_RECOVER_RE,
            Self::Methods => &METHOD_RE,
            Self::FunctionCalls => &FUNCTION_CALL_RE,
        }
    }

    /// Values this category captures from `line`. Empty when it doesn't match.
    pub fn capture(&self, line: &str) -> Vec<String> {
        let Some(caps) = self.regex().captures(line) else {
            return Vec::new();
        };
        let group = |i: usize| group_str(&caps, i).to_string();

        match self {
            // Recorded as the declared type, not the identifier.
            Self::Variables | Self::Constants | Self::Channels => vec![group(2)],
            // A block-comment close has no group 1 and records "".
            Self::Comments => vec![group(1)],
            Self::ErrorHandling => vec![group(1), group(2), group(3)],
            Self::Methods => vec![format!("{}.{}", group_str(&caps, 2), group_str(&caps, 3))],
            _ => vec![group(1)],
        }
    }
}

fn group_str<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Every (category, value) pair found on `line`, in scan order.
pub fn scan_line(line: &str) -> Vec<(Category, String)> {
    Category::SCAN_ORDER
        .iter()
        .flat_map(|category| {
            category
                .capture(line)
                .into_iter()
                .map(move |value| (*category, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(category: Category, line: &str) -> Vec<String> {
        category.capture(line)
    }

    #[test]
    fn test_single_line_import() {
        assert_eq!(values(Category::Imports, r#"import ( "fmt" )"#), vec!["fmt"]);
        assert!(values(Category::Imports, r#"import "fmt""#).is_empty());
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            values(Category::Comments, "    // keeps the lock"),
            vec![" keeps the lock"]
        );
        assert_eq!(values(Category::Comments, "/* done */"), vec![""]);
        assert!(values(Category::Comments, "x := 1 // trailing").is_empty());
    }

    #[test]
    fn test_declarations_capture_type_token() {
        assert_eq!(values(Category::Variables, "var count int"), vec!["int"]);
        assert_eq!(values(Category::Constants, "const limit uint8 = 4"), vec!["uint8"]);
        assert_eq!(values(Category::Structs, "type Server struct {"), vec!["Server"]);
        assert_eq!(
            values(Category::Interfaces, "type Store interface{"),
            vec!["Store"]
        );
    }

    #[test]
    fn test_method_uses_receiver_type() {
        assert_eq!(
            values(Category::Methods, "func (s *Server) Start(ctx context.Context) error {"),
            vec!["Server.Start"]
        );
        assert_eq!(
            values(Category::Methods, "func (c Client) Do() {"),
            vec!["Client.Do"]
        );
        assert!(values(Category::Methods, "func main() {").is_empty());
    }

    #[test]
    fn test_channels() {
        assert_eq!(
            values(Category::Channels, "out := make(chan<-int, 4)"),
            vec!["chan<-int,"]
        );
        assert!(values(Category::Channels, "ch := make(chan int)").is_empty());
    }

    #[test]
    fn test_error_handling_records_three_values() {
        assert_eq!(
            values(Category::ErrorHandling, "data, err := load(path)"),
            vec!["data", "err", "load"]
        );
        // The callee must be a bare identifier.
        assert!(values(Category::ErrorHandling, "data, err := os.ReadFile(path)").is_empty());
    }

    #[test]
    fn test_control_flow_needs_brace_after_keyword() {
        assert_eq!(values(Category::ControlFlow, "} else {"), vec!["else"]);
        assert_eq!(values(Category::ControlFlow, "select {"), vec!["select"]);
        assert!(values(Category::ControlFlow, "case msg := <-in:").is_empty());
    }

    #[test]
    fn test_defer_and_panic() {
        assert_eq!(values(Category::DeferStatements, "defer close(done)"), vec!["close"]);
        assert_eq!(values(Category::PanicRecover, "if r := recover(); r != nil {"), vec!["recover"]);
        assert_eq!(values(Category::PanicRecover, "panic(err)"), vec!["panic"]);
    }

    #[test]
    fn test_type_assertion_and_call() {
        assert_eq!(values(Category::TypeAssertions, "total := (a + b)"), vec!["total"]);
        assert_eq!(
            values(Category::FunctionCalls, r#"fmt.Println("hi")"#),
            vec!["Println"]
        );
    }

    #[test]
    fn test_scan_line_preserves_rule_order() {
        let found = scan_line("defer file.Close()");
        let categories: Vec<Category> = found.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, vec![Category::FunctionCalls]);

        let found = scan_line("defer cleanup()");
        assert_eq!(
            found,
            vec![
                (Category::DeferStatements, "cleanup".to_string()),
                (Category::FunctionCalls, "cleanup".to_string()),
            ]
        );
    }
}
