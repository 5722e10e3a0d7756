use super::*;

fn scan_one(block: &str) -> RawTag {
    let mut tags = scan_tags(block);
    assert_eq!(tags.len(), 1, "expected one tag in {block:?}");
    tags.remove(0)
}

#[test]
fn parenthesized_params_split_on_commas() {
    let tag = scan_one("\\pos(10, 20)");
    assert_eq!(tag.cmd, "pos");
    assert_eq!(tag.params, ["10", "20"]);
}

#[test]
fn backslash_glues_the_remaining_params() {
    let tag = scan_one("\\t(0,500,\\1c&HFF&,\\2c&H00&)");
    assert_eq!(tag.cmd, "t");
    assert_eq!(tag.params, ["0", "500", "\\1c&HFF&,\\2c&H00&"]);
}

#[test]
fn several_tags_scan_in_order() {
    let tags = scan_tags("\\b1\\i1\\pos(1,2)");
    let cmds: Vec<&str> = tags.iter().map(|t| t.cmd.as_str()).collect();
    assert_eq!(cmds, ["b1", "i1", "pos"]);
}

#[test]
fn peel_splits_glued_arguments() {
    let mut tag = scan_one("\\fs20");
    assert!(peel(&mut tag));
    assert_eq!(tag.cmd, "fs");
    assert_eq!(tag.params, ["20"]);

    let mut tag = scan_one("\\bord1.5");
    assert!(peel(&mut tag));
    assert_eq!(tag.cmd, "bord");
    assert_eq!(tag.params, ["1.5"]);
}

#[test]
fn peel_prefers_longer_prefixes() {
    for (input, cmd, param) in [
        ("\\blur2", "blur", "2"),
        ("\\bord3", "bord", "3"),
        ("\\be1", "be", "1"),
        ("\\b700", "b", "700"),
        ("\\fscx50", "fscx", "50"),
        ("\\fsc", "fsc", ""),
        ("\\fsp4", "fsp", "4"),
        ("\\frz45", "frz", "45"),
        ("\\fr45", "fr", "45"),
        ("\\kf30", "kf", "30"),
        ("\\k30", "k", "30"),
        ("\\xbord2", "xbord", "2"),
        ("\\shad2", "shad", "2"),
        ("\\s1", "s", "1"),
    ] {
        let mut tag = scan_one(input);
        assert!(peel(&mut tag), "{input} not recognized");
        assert_eq!(tag.cmd, cmd, "for {input}");
        if param.is_empty() {
            assert!(tag.params.is_empty(), "for {input}: {:?}", tag.params);
        } else {
            assert_eq!(tag.params, [param], "for {input}");
        }
    }
}

#[test]
fn color_arguments_lose_their_hex_fence() {
    let mut tag = scan_one("\\1c&H0000FF&");
    assert!(peel(&mut tag));
    assert_eq!(tag.cmd, "1c");
    assert_eq!(tag.params, ["0000FF"]);

    let mut tag = scan_one("\\alpha&H80&");
    assert!(peel(&mut tag));
    assert_eq!(tag.cmd, "alpha");
    assert_eq!(tag.params, ["80"]);
}

#[test]
fn unknown_commands_are_flagged() {
    let mut tag = scan_one("\\zzz9");
    assert!(!peel(&mut tag));
    // The short fade form is historically counted as unrecognized by the
    // lexer even though the fold interprets it.
    let mut tag = scan_one("\\fad(0,500)");
    assert!(!peel(&mut tag));
    assert_eq!(tag.params, ["0", "500"]);
}

#[test]
fn empty_command_is_skipped() {
    assert!(scan_tags("\\\\b1").iter().any(|t| t.cmd == "b1"));
    assert!(scan_tags("no tags here").is_empty());
}
