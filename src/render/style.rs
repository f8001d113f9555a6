//! Stylesheet embedded in every rendered document.

pub const STYLESHEET: &str = r#"body { font-family: sans-serif; max-width: 60em; margin: auto; }
div[role="ami_entry"] { border-bottom: 1px solid #ddd; padding: 0.5em 0; }
div[role="ami_entry"][data-status="hidden"] { display: none; }
.entry-checkboxes { float: right; font-size: 0.85em; }
.entry-checkboxes label { display: block; }
.synonym_list { font-size: 0.9em; color: #555; }
.synonym_list li { display: inline; margin-right: 0.5em; }
.category-true-match { border-left: 4px solid #2e7d32; padding-left: 0.5em; }
.category-redirect { border-left: 4px solid #f9a825; padding-left: 0.5em; }
.category-no-wikipedia { border-left: 4px solid #9e9e9e; padding-left: 0.5em; color: #777; }
.category-general-term { border-left: 4px solid #bdbdbd; padding-left: 0.5em; color: #777; }
.category-disambiguation { border-left: 4px solid #c62828; padding-left: 0.5em; }
.disambiguation-options { background: #fff3f3; padding: 0.25em 0.5em; }"#;
