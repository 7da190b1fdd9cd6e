//! Project Gutenberg boilerplate removal

const START_MARKERS: [&str; 2] = ["*** START OF", "***START OF"];
const END_MARKERS: [&str; 2] = ["*** END OF", "***END OF"];

/// Longest run of blank lines kept in the cleaned text
const MAX_BLANK_RUN: usize = 2;

fn has_marker(line: &str, markers: &[&str]) -> bool {
    let upper = line.to_uppercase();
    markers.iter().any(|m| upper.contains(m))
}

/// Strip the license header and footer and squeeze blank-line runs
///
/// Text before the first `*** START OF` line and from the last `*** END OF`
/// line onward is dropped. Files without markers keep all their lines.
pub fn clean_gutenberg_text(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let start = lines
        .iter()
        .position(|line| has_marker(line, &START_MARKERS))
        .map_or(0, |i| i + 1);
    let end = lines
        .iter()
        .rposition(|line| has_marker(line, &END_MARKERS))
        .unwrap_or(lines.len());

    let body = if start <= end { &lines[start..end] } else { &[][..] };

    let mut cleaned = Vec::with_capacity(body.len());
    let mut blank_run = 0;
    for line in body {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= MAX_BLANK_RUN {
                cleaned.push(*line);
            }
        } else {
            blank_run = 0;
            cleaned.push(*line);
        }
    }

    cleaned.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_header_and_footer() {
        let text = "The Project Gutenberg eBook\nlicense\n\
                    *** START OF THE PROJECT GUTENBERG EBOOK TAO TE CHING ***\n\
                    The Tao that can be told\nis not the eternal Tao\n\
                    *** END OF THE PROJECT GUTENBERG EBOOK TAO TE CHING ***\nmore license";
        assert_eq!(
            clean_gutenberg_text(text),
            "The Tao that can be told\nis not the eternal Tao"
        );
    }

    #[test]
    fn test_markers_are_case_insensitive_and_compact() {
        let text = "header\n***start of this ebook\nbody\n***end of this ebook\nfooter";
        assert_eq!(clean_gutenberg_text(text), "body");
    }

    #[test]
    fn test_without_markers_keeps_everything() {
        assert_eq!(clean_gutenberg_text("a\nb"), "a\nb");
    }

    #[test]
    fn test_collapses_blank_runs() {
        let text = "one\n\n\n\n\ntwo\n \n\nthree";
        assert_eq!(clean_gutenberg_text(text), "one\n\n\ntwo\n \n\nthree");
    }
}
