//! Property tests for the pagination engine.

use proptest::prelude::*;

use fb2pager::rtf::plain_text;
use fb2pager::{
    LayoutOracle, LoadOptions, MonospaceOracle, PageDimensions, PaginationConfig,
    PaginationStrategy, load_document,
};

fn fb2(paragraphs: &[String]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(
        r#"<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0"><body><section>{body}</section></body></FictionBook>"#
    )
}

fn paragraph() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,14}", prop::sample::select(vec![" ", "-", " "])), 1..40)
        .prop_map(|parts| {
            parts
                .into_iter()
                .map(|(word, sep)| format!("{word}{sep}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
}

fn is_break(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn pages_cover_the_chapter_exactly(
        paragraphs in prop::collection::vec(paragraph(), 1..6),
        width in 40u32..300,
        height in 30u32..200,
    ) {
        let xml = fb2(&paragraphs);
        let oracle = MonospaceOracle::new(10.0, 10.0);
        let options = LoadOptions::new().with_dimensions(PageDimensions::new(width, height));
        let doc = load_document(xml.as_bytes(), &options, &oracle).unwrap();
        let chapter = &doc.chapters()[0];

        let texts: Vec<String> = chapter.pages().iter().map(|p| plain_text(p)).collect();
        prop_assert_eq!(texts.concat(), chapter.plain_text());
        prop_assert!(texts.iter().all(|t| !t.is_empty()));

        let threshold = 0.8 * height as f32;
        for (page, text) in chapter.pages()[..texts.len() - 1].iter().zip(&texts) {
            // a page either ends after a break character or is a forced
            // cut through text that has none
            let forced = !text.chars().any(is_break);
            prop_assert!(forced || text.chars().last().is_some_and(is_break));
            // a trailing space never adds height, so such a page fits
            if text.ends_with(' ') {
                prop_assert!(oracle.measure(page, width).unwrap() <= threshold);
            }
        }
    }

    #[test]
    fn bisect_matches_linear(
        paragraphs in prop::collection::vec(paragraph(), 1..4),
        width in 40u32..200,
        height in 30u32..120,
        fill in 0.3f32..1.0,
    ) {
        let xml = fb2(&paragraphs);
        let oracle = MonospaceOracle::new(8.0, 12.0);
        let options = LoadOptions::new().with_dimensions(PageDimensions::new(width, height));
        let pagination = PaginationConfig::new().with_fill_threshold(fill);

        let bisect = load_document(
            xml.as_bytes(),
            &options.clone().with_pagination(pagination.clone()),
            &oracle,
        )
        .unwrap();
        let linear = load_document(
            xml.as_bytes(),
            &options.with_pagination(pagination.with_strategy(PaginationStrategy::Linear)),
            &oracle,
        )
        .unwrap();

        prop_assert_eq!(bisect.chapters()[0].pages(), linear.chapters()[0].pages());
    }
}
