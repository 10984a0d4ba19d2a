// `>|` generates additional line break at the end of the file, so remove it manually
//run cargo run -p bqfmt-cli -- bqfmt/tests/dirty.sql --width 80 >| bqfmt/tests/pretty_80.sql
//run cargo run -p bqfmt-cli -- bqfmt/tests/dirty.sql --width 40 >| bqfmt/tests/pretty_40.sql
mod main {

    use bqfmt::{FormatOptions, pretty_print};

    fn check(ans: &str, width: usize) {
        let options = FormatOptions::with_width(width);
        let src = include_str!("dirty.sql").replace("\r\n", "\n");
        let ans = ans.replace("\r\n", "\n");
        let res = pretty_print(&src, &Some("tests/dirty.sql".into()), &options)
            .expect("failed to pretty print");
        assert_eq!(res, ans); // format success
        let res2 = pretty_print(res.as_str(), &Some("tests/pretty.sql".into()), &options);
        assert!(res2.is_ok()); // formatted document does not contain syntax error
        assert_eq!(res, res2.unwrap()) // pretty printed document is identical
    }

    #[test]
    fn basic_80() {
        check(include_str!("pretty_80.sql"), 80);
    }

    #[test]
    fn basic_40() {
        check(include_str!("pretty_40.sql"), 40);
    }

    #[test]
    fn cst_json_input() {
        let options = FormatOptions::default();
        let src = include_str!("dirty.sql");
        let nodes = bqfmt_lang::parse(src, &None).expect("failed to parse");
        let json = bqfmt_lang::cst::to_json(&nodes).expect("failed to serialize");
        let res = bqfmt::format_json(&json, &options).expect("failed to pretty print");
        assert_eq!(res, include_str!("pretty_80.sql").replace("\r\n", "\n"));
    }

    #[test]
    fn syntax_error_is_reported() {
        let res = pretty_print("SELECT FROM", &None, &FormatOptions::default());
        assert!(res.is_err());
    }
}
