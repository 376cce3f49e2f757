//! Keyword search over posts

use crate::content::Post;

const TITLE_WEIGHT: usize = 3;
const TAG_WEIGHT: usize = 2;
const BODY_WEIGHT: usize = 1;

/// Posts containing every whitespace-separated term of `query`, best first.
///
/// Matching is case-insensitive against the title, tags and raw body.
/// Equal scores keep the order of `posts`.
pub fn search<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &Post)> = posts
        .iter()
        .filter_map(|post| score(post, &terms).map(|s| (s, post)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, post)| post).collect()
}

fn score(post: &Post, terms: &[String]) -> Option<usize> {
    let title = post.title.to_lowercase();
    let body = post.raw.to_lowercase();
    let tags: Vec<String> = post.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut total = 0;
    for term in terms {
        let in_title = title.matches(term.as_str()).count();
        let in_tags = tags.iter().filter(|t| t.contains(term.as_str())).count();
        let in_body = body.matches(term.as_str()).count();

        let term_score = in_title * TITLE_WEIGHT + in_tags * TAG_WEIGHT + in_body * BODY_WEIGHT;
        if term_score == 0 {
            return None;
        }
        total += term_score;
    }
    Some(total)
}
