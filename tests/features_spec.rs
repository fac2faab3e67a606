use rover::features::{analyze_file, extract, record_path, FeatureRecord};
use speculate2::speculate;

const SERVER_GO: &str = r#"package server

import ( "net/http" )

// Server handles requests.
type Server struct {
	store Store
}

type Store interface {
	Get(key string) (string, error)
}

var defaultTimeout int
const maxConns int = 10

func (s *Server) Handle(w http.ResponseWriter, r *http.Request) {
	defer cleanup()
	value, err := lookup(r.URL.Path)
	if err != nil {
		panic(err)
	}
	select {
	default:
	}
	fmt.Println(value)
}
"#;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

speculate! {
    describe "extract" {
        it "classifies a realistic file" {
            let record = extract(SERVER_GO);

            assert_eq!(record.package_name, "server");
            assert_eq!(record.imports, strings(&["net/http"]));
            assert_eq!(record.comments, strings(&[" Server handles requests."]));
            assert_eq!(record.structs, strings(&["Server"]));
            assert_eq!(record.interfaces, strings(&["Store"]));
            assert_eq!(record.variables, strings(&["int"]));
            assert_eq!(record.constants, strings(&["int"]));
            assert_eq!(record.methods, strings(&["Server.Handle"]));
            assert_eq!(record.defer_statements, strings(&["cleanup"]));
            assert_eq!(record.error_handling, strings(&["value", "err", "lookup"]));
            assert_eq!(record.panic_recover, strings(&["panic"]));
            assert_eq!(record.control_flow, strings(&["select"]));
            assert_eq!(
                record.function_calls,
                strings(&["Get", "Handle", "cleanup", "lookup", "panic", "Println"])
            );
            assert!(record.channels.is_empty());
            assert!(record.type_assertions.is_empty());
        }

        it "keeps a single package declaration" {
            let record = extract("package main\n\nfunc main() {}\n");
            assert_eq!(record.package_name, "main");
        }

        it "takes the last of two package declarations" {
            let record = extract("package alpha\nvar x int\npackage beta\n");
            assert_eq!(record.package_name, "beta");
        }

        it "collapses a repeated import to its first position" {
            let source = "import ( \"fmt\" )\nimport ( \"os\" )\nimport ( \"fmt\" )\nimport ( \"fmt\" )\n";
            let record = extract(source);
            assert_eq!(record.imports, strings(&["fmt", "os"]));
        }

        it "keeps variables and constants independent" {
            let record = extract("var x int\nconst y int\n");
            assert_eq!(record.variables, strings(&["int"]));
            assert_eq!(record.constants, strings(&["int"]));
        }

        it "deduplicates within each list only" {
            let record = extract("a, b := f(x)\nb, c := f(y)\n");
            assert_eq!(record.error_handling, strings(&["a", "b", "f", "c"]));
            assert_eq!(record.function_calls, strings(&["f"]));
        }

        it "sees multi-line constructs one line at a time" {
            let record = extract("import (\n\t\"fmt\"\n\t\"os\"\n)\n");
            assert!(record.imports.is_empty());
        }
    }

    describe "analyze_file" {
        before {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
        }

        it "writes a pretty record next to the source" {
            let source = dir.path().join("server.go");
            std::fs::write(&source, SERVER_GO).expect("Failed to write source");

            let (target, record) = analyze_file(&source).expect("Analysis failed");

            assert_eq!(target, dir.path().join("server.go.json"));
            assert_eq!(target, record_path(&source));

            let written = std::fs::read_to_string(&target).expect("Failed to read record");
            assert!(written.starts_with("{\n  \"packageName\": \"server\",\n  \"imports\": ["));

            let parsed: FeatureRecord = serde_json::from_str(&written).expect("Invalid JSON");
            assert_eq!(parsed, record);
        }

        it "writes empty lists for a file with no matches" {
            let source = dir.path().join("notes.txt");
            std::fs::write(&source, "nothing to see here\n").expect("Failed to write source");

            let (target, _) = analyze_file(&source).expect("Analysis failed");
            let json: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(target).unwrap()).unwrap();

            assert_eq!(json["packageName"], "");
            for key in ["imports", "structs", "methods", "functionCalls", "panicRecover"] {
                assert_eq!(json[key], serde_json::json!([]), "{} should be empty", key);
            }
        }

        it "fails for a missing file without writing anything" {
            let source = dir.path().join("missing.go");
            assert!(analyze_file(&source).is_err());
            assert!(!record_path(&source).exists());
        }
    }
}
