//! Codemod behaviour tests.
//!
//! These run the built-in codemods through the public runner API.

use ciseau_atelier::{
    run_codemod, run_pipeline, CodemodError, CodemodRegistry, PropsToDestructuring,
    SelfReference, SourceType, TransformOptions,
};

fn self_options() -> TransformOptions {
    TransformOptions {
        self_reference: SelfReference::Identifier("self".to_string()),
        ..Default::default()
    }
}

fn destructure_with(source: &str, options: &TransformOptions) -> String {
    run_codemod(&PropsToDestructuring, source, SourceType::jsx(), options)
        .unwrap()
        .code
}

fn destructure_self(source: &str) -> String {
    destructure_with(source, &self_options())
}

fn destructure(source: &str) -> String {
    destructure_with(source, &TransformOptions::default())
}

fn pipeline(source: &str) -> String {
    let registry = CodemodRegistry::builtin();
    let codemods = registry.ordered(&[]).unwrap();
    run_pipeline(
        &codemods,
        source,
        "src/components/Item.jsx",
        SourceType::mjs().with_jsx(true),
        &TransformOptions::default(),
    )
    .unwrap()
    .code
}

// =============================================================================
// Props Destructuring
// =============================================================================

mod destructuring {
    use super::*;

    #[test]
    fn reads_become_sorted_locals() {
        assert_eq!(
            destructure_self("function f(){ return self.props.x + self.props.y; }"),
            "function f(){ const { x, y } = self.props; return x + y; }"
        );
    }

    #[test]
    fn local_var_shadows_read() {
        let source = "function f(){ var x = 1; return self.props.x; }";
        assert_eq!(destructure_self(source), source);
    }

    #[test]
    fn aliased_binding_is_not_reused() {
        let source = "function f(){ const { z: x } = self.props; return self.props.x; }";
        assert_eq!(destructure_self(source), source);
    }

    #[test]
    fn merges_into_existing_destructuring() {
        assert_eq!(
            destructure_self("function f(){ const { a } = self.props; return a + self.props.b; }"),
            "function f(){ const { a, b } = self.props; return a + b; }"
        );
    }

    #[test]
    fn reserved_word_is_never_bound() {
        let source = "function f(){ return self.props.class; }";
        assert_eq!(destructure_self(source), source);
    }

    #[test]
    fn shadowed_name_is_untouched_everywhere() {
        assert_eq!(
            destructure_self("function f(){ let x = 1; return self.props.x + self.props.y; }"),
            "function f(){ const { y } = self.props; let x = 1; return self.props.x + y; }"
        );
    }

    #[test]
    fn this_reference_by_default() {
        assert_eq!(
            destructure("function f(){ return this.props.b + this.props.a; }"),
            "function f(){ const { a, b } = this.props; return b + a; }"
        );
    }

    #[test]
    fn self_props_ignored_with_this_reference() {
        let source = "function f(){ return self.props.x; }";
        assert_eq!(destructure(source), source);
    }

    #[test]
    fn class_render_method() {
        let source = "class Item extends Component {
    render() {
        return (
            <li className={this.props.className}>
                {this.props.label}
            </li>
        );
    }
}
";
        insta::assert_snapshot!(destructure(source), @r"
        class Item extends Component {
            render() {
                const { className, label } = this.props;
                return (
                    <li className={className}>
                        {label}
                    </li>
                );
            }
        }
        ");
    }

    #[test]
    fn merges_into_multiline_pattern() {
        let source = "function Item() {
    const {
        a,
        b
    } = this.props;
    return a + b + this.props.d + this.props.c;
}
";
        insta::assert_snapshot!(destructure(source), @r"
        function Item() {
            const {
                a,
                b,
                c,
                d,
            } = this.props;
            return a + b + d + c;
        }
        ");
    }

    #[test]
    fn merge_keeps_existing_trailing_comma() {
        let source = "function Item() {
    const {
        a,
    } = this.props;
    return a + this.props.b;
}
";
        insta::assert_snapshot!(destructure(source), @r"
        function Item() {
            const {
                a,
                b,
            } = this.props;
            return a + b;
        }
        ");
    }

    #[test]
    fn constructor_declares_after_super() {
        let source = "class Counter extends Component {
    constructor(props) {
        super(props);
        this.state = { count: this.props.initial };
    }
}
";
        insta::assert_snapshot!(destructure(source), @r"
        class Counter extends Component {
            constructor(props) {
                super(props);
                const { initial } = this.props;
                this.state = { count: initial };
            }
        }
        ");
    }

    #[test]
    fn second_run_changes_nothing() {
        let source = "class A {
    render() {
        const { a } = this.props;
        return <div a={a} b={this.props.b} c={this.props.c} />;
    }
    other() {
        return this.props.d;
    }
}
";
        let once = destructure(source);
        assert_ne!(once, source);
        assert_eq!(destructure(&once), once);
    }

    #[test]
    fn output_is_deterministic() {
        let source = "function f(){ return [this.props.z, this.props.m, this.props.a]; }";
        let first = destructure(source);
        for _ in 0..5 {
            assert_eq!(destructure(source), first);
        }
        assert_eq!(
            first,
            "function f(){ const { a, m, z } = this.props; return [z, m, a]; }"
        );
    }
}

// =============================================================================
// Pipeline
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn component_then_destructuring() {
        let source = "import React from 'react';

const HistoryItem = (props) => (
  <li className={props.className}>{props.label}</li>
);
";
        insta::assert_snapshot!(pipeline(source), @r"
        import React, { Component } from 'react';

        class HistoryItem extends Component {
          render() {
            const { className, label } = this.props;
            return (
              <li className={className}>{label}</li>
            );
          }
        }
        ");
    }

    #[test]
    fn bind_runs_last() {
        let source = "class A extends B {
    render() {
        return <button onClick={this.onClick.bind(this)} label={this.props.label} />;
    }
}
";
        insta::assert_snapshot!(pipeline(source), @r"
        class A extends B {
            render() {
                const { label } = this.props;
                return <button onClick={::this.onClick} label={label} />;
            }
        }
        ");
    }

    #[test]
    fn untouched_file_is_identical() {
        let source = "export const answer = 42;\n";
        assert_eq!(pipeline(source), source);
    }

    #[test]
    fn parse_failure_propagates() {
        let registry = CodemodRegistry::builtin();
        let codemods = registry.ordered(&[]).unwrap();
        let result = run_pipeline(
            &codemods,
            "function (",
            "broken.js",
            SourceType::mjs(),
            &TransformOptions::default(),
        );
        assert!(matches!(result, Err(CodemodError::Parse { .. })));
    }

    #[test]
    fn path_overrides_filter_codemods() {
        let registry = CodemodRegistry::builtin();
        let codemods = registry.ordered(&[]).unwrap();
        let mut options = TransformOptions::default();
        options
            .paths
            .insert("props-to-destructuring".to_string(), vec!["legacy/".to_string()]);

        let source = "function f(){ return this.props.x; }";
        let output = run_pipeline(&codemods, source, "src/App.js", SourceType::mjs(), &options)
            .unwrap();
        assert_eq!(output.code, source);
        assert_eq!(output.filtered, vec!["props-to-destructuring"]);

        let output = run_pipeline(
            &codemods,
            source,
            "src/legacy/App.js",
            SourceType::mjs(),
            &options,
        )
        .unwrap();
        assert_eq!(output.applied, vec!["props-to-destructuring"]);
    }
}
