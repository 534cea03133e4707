use alto_core::{LineEnding, LineIndex, TextSize};
use proptest::prelude::*;

/// Text drawn from AL punctuation, every line terminator and some
/// multi-byte characters.
fn al_text() -> impl Strategy<Value = String> {
    let ch = prop_oneof![
        12 => prop::sample::select(vec![
            'a', 'Q', 'x', ':', '=', ';', ' ', '\t', '(', ')', '"', '\'',
        ]),
        3 => Just('\n'),
        2 => Just('\r'),
        2 => Just('é'),
        1 => Just('中'),
        1 => Just('😀'),
    ];
    prop::collection::vec(ch, 0..=64).prop_map(String::from_iter)
}

fn al_text_with_offset() -> impl Strategy<Value = (String, usize)> {
    al_text().prop_flat_map(|text| {
        let offsets: Vec<usize> = (0..=text.len()).filter(|&i| text.is_char_boundary(i)).collect();
        (Just(text), prop::sample::select(offsets))
    })
}

fn is_inside_crlf(text: &str, offset: usize) -> bool {
    offset > 0
        && offset < text.len()
        && text.as_bytes()[offset - 1] == b'\r'
        && text.as_bytes()[offset] == b'\n'
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn position_round_trips((text, offset) in al_text_with_offset()) {
        prop_assume!(!is_inside_crlf(&text, offset));
        let offset = TextSize::try_from(offset).unwrap();
        let index = LineIndex::new(&text);
        let position = index.position(&text, offset);
        prop_assert_eq!(index.offset_of_position(&text, position), Some(offset));
    }

    #[test]
    fn line_start_is_never_after_offset((text, offset) in al_text_with_offset()) {
        let offset = TextSize::try_from(offset).unwrap();
        prop_assert!(LineIndex::new(&text).line_start_of(offset) <= offset);
    }

    #[test]
    fn normalize_to_detected_style_is_idempotent(text in al_text()) {
        let style = LineEnding::detect(&text);
        let once = style.normalize(&text);
        prop_assert_eq!(style.normalize(&once), once.clone());
    }
}
