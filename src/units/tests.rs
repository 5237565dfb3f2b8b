use super::*;

fn extractor() -> UnitExtractor {
    UnitExtractor::new().expect("unit regexes should compile")
}

fn segmenter() -> Segmenter {
    Segmenter::new().expect("segmenter regexes should compile")
}

fn code(value: &str) -> UnitToken {
    UnitToken::Code(value.to_string())
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

#[test]
fn extract_text_keeps_first_seen_order_without_duplicates() {
    let tokens = extractor().extract_text("CAB201 Programming ... CAB201 again ... ZZZ999 last");
    assert_eq!(tokens, vec![code("CAB201"), code("ZZZ999")]);
}

#[test]
fn extract_text_ignores_codes_inside_longer_tokens() {
    let tokens = extractor().extract_text("XCAB201 CAB2010 cab201 IFB104.");
    assert_eq!(tokens, vec![code("IFB104")]);
}

#[test]
fn qut_you_placeholder_is_emitted_per_occurrence() {
    let tokens = extractor().extract_text(
        "Select one QUT You unit\nCAB201\nselect one QUT You\nunit",
    );
    assert_eq!(
        tokens,
        vec![
            UnitToken::QutYouElective,
            code("CAB201"),
            UnitToken::QutYouElective,
        ]
    );
}

#[test]
fn complementary_placeholder_is_emitted_once_per_block() {
    let text = "Complementary Studies unit\nCAB201\nComplementary Studies unit\ncomplementary studies unit";
    let tokens = extractor().extract_text(text);
    assert_eq!(tokens, vec![UnitToken::ComplementaryStudies, code("CAB201")]);
}

#[test]
fn block_without_units_yields_empty_list() {
    assert!(extractor().extract_text("Semester break").is_empty());
}

#[test]
fn unit_codes_drop_placeholders() {
    let codes = extractor().unit_codes("ABB101 Select one QUT You unit ABB102 ABB101");
    assert_eq!(codes, vec!["ABB101".to_string(), "ABB102".to_string()]);
}

#[test]
fn extract_rows_attributes_units_to_semester_cursor() {
    let rows = vec![
        row(&["Year 1, Semester 1"]),
        row(&["CAB201", "Programming Principles", "12"]),
        row(&["", "IFB104", "Building IT Systems"]),
        row(&["Credit points", "48"]),
        row(&["Year 1, Semester 2 July"]),
        row(&["CAB202", "Microprocessors"]),
        row(&["CAB202", "Microprocessors"]),
        row(&["Select one QUT You unit"]),
    ];

    let extraction = extractor().extract_rows(&segmenter(), &rows);
    assert_eq!(extraction.attribution, PreHeaderAttribution::NotNeeded);
    assert_eq!(
        extraction.semesters.keys().collect::<Vec<_>>(),
        vec!["year1semester1", "year1semester2"]
    );

    let first = &extraction.semesters["year1semester1"];
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].title, "Programming Principles");
    assert_eq!(first[1].token, code("IFB104"));
    assert_eq!(first[1].title, "Building IT Systems");

    assert_eq!(
        extraction.tokens_for("year1semester2"),
        vec![code("CAB202"), UnitToken::QutYouElective]
    );
    assert!(extraction.tokens_for("year3semester1").is_empty());
}

#[test]
fn pre_header_rows_fall_back_to_empty_first_semester() {
    let rows = vec![
        row(&["ABB101", "Design Studio 1"]),
        row(&["Complementary Studies unit"]),
        row(&["Year 1, Semester 1"]),
        row(&["Year 1, Semester 2"]),
        row(&["ABB102", "Design Studio 2"]),
    ];

    let extraction = extractor().extract_rows(&segmenter(), &rows);
    assert_eq!(
        extraction.attribution,
        PreHeaderAttribution::FirstSemesterFallback { units: 2 }
    );
    assert_eq!(
        extraction.tokens_for(FIRST_SEMESTER_KEY),
        vec![code("ABB101"), UnitToken::ComplementaryStudies]
    );
    assert!(extraction.pre_header.is_empty());
}

#[test]
fn pre_header_rows_stay_unattributed_when_first_semester_has_units() {
    let rows = vec![
        row(&["ABB101", "Design Studio 1"]),
        row(&["Year 1, Semester 1"]),
        row(&["ABB103", "Histories"]),
    ];

    let extraction = extractor().extract_rows(&segmenter(), &rows);
    assert_eq!(
        extraction.attribution,
        PreHeaderAttribution::Unattributed { units: 1 }
    );
    assert_eq!(extraction.tokens_for(FIRST_SEMESTER_KEY), vec![code("ABB103")]);
    assert_eq!(extraction.pre_header.len(), 1);
}

#[test]
fn pre_header_rows_stay_unattributed_when_first_semester_is_not_year_one() {
    let rows = vec![
        row(&["ABB201", "Design Studio 3"]),
        row(&["Year 2, Semester 1"]),
    ];

    let extraction = extractor().extract_rows(&segmenter(), &rows);
    assert_eq!(
        extraction.attribution,
        PreHeaderAttribution::Unattributed { units: 1 }
    );
    assert!(extraction.tokens_for("year2semester1").is_empty());
}

#[test]
fn append_tokens_applies_block_rules_across_repeated_headers() {
    let mut tokens = vec![code("CAB201"), UnitToken::ComplementaryStudies];
    append_tokens(
        &mut tokens,
        vec![
            code("cab201"),
            UnitToken::ComplementaryStudies,
            UnitToken::QutYouElective,
            code("CAB202"),
        ],
    );

    assert_eq!(
        tokens,
        vec![
            code("CAB201"),
            UnitToken::ComplementaryStudies,
            UnitToken::QutYouElective,
            code("CAB202"),
        ]
    );
}
