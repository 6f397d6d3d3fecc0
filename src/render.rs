// 🖼️ Renderer - HTML tables for groups
//
// Output must be byte-stable: members are always re-sorted by collation,
// never trusted to come out of the store in order.

use crate::classifier::CompoundClassifier;
use crate::collation::{sort_by_collation, Collator};
use crate::db::{count_member_links_for_headword, Group};
use crate::error::Result;
use crate::headword::HeadwordRecord;
use crate::registry::GroupKind;
use regex::{Captures, Regex};
use rusqlite::Connection;
use std::sync::LazyLock;

static HOMOGRAPH_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (\d+)").expect("valid homograph number regex"));

const HAIR_SPACE: char = '\u{200A}';

fn superscript_digit(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        other => other,
    }
}

/// "gata 1" → "gata\u{200A}¹"
pub fn superscript_homograph(pali_1: &str) -> String {
    HOMOGRAPH_NUMBER
        .replace_all(pali_1, |caps: &Captures<'_>| {
            let digits: String = caps[1].chars().map(superscript_digit).collect();
            format!("{HAIR_SPACE}{digits}")
        })
        .into_owned()
}

/// One table row: headword, part of speech, gloss and completion marker
pub fn headword_row(record: &HeadwordRecord) -> String {
    format!(
        "\n<tr><th>{}</th><td><b>{}</b></td><td>{} {}</td></tr>",
        superscript_homograph(&record.pali_1),
        record.pos,
        record.gloss(),
        record.degree_of_completion(),
    )
}

/// Render a group's members as a table, in collation order.
///
/// Compound family tables only list classifier-qualified members: under
/// "kamma" the anchor words "kamma 1", "kamma 2" are linked but not listed.
pub fn render_group_table<C: Collator + ?Sized>(
    kind: GroupKind,
    members: &[HeadwordRecord],
    collator: &C,
    classifier: &CompoundClassifier,
) -> String {
    let mut rows: Vec<&HeadwordRecord> = members
        .iter()
        .filter(|w| kind == GroupKind::Set || classifier.is_compound_member(w))
        .collect();
    sort_by_collation(&mut rows, collator, |w| w.pali_1.as_str());

    let mut html = String::from("\n<table class='family'>\n");
    for w in rows {
        html.push_str(&headword_row(w));
    }
    html.push_str("\n\n</table>\n");

    html
}

/// Render the cached table of a stored group
pub fn render_group<C: Collator + ?Sized>(
    conn: &Connection,
    group: &Group,
    collator: &C,
    classifier: &CompoundClassifier,
) -> Result<String> {
    let members = crate::db::members_of(conn, group.kind, group.id)?;
    Ok(render_group_table(group.kind, &members, collator, classifier))
}

/// Should the headword's page link out to its compound families?
/// Reads the resolved relation, not the tag field.
pub fn should_show_group_affordance(conn: &Connection, record: &HeadwordRecord) -> Result<bool> {
    let links = count_member_links_for_headword(conn, GroupKind::CompoundFamily, record.id)?;
    Ok(links > 0)
}
