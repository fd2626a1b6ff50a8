//! Home page post selection

use super::Post;

/// Select the most recent posts for display.
///
/// Sorts by date descending; posts sharing the same date are ordered by
/// slug ascending so the result never depends on input order. Returns at
/// most `limit` posts.
pub fn select_top_posts(posts: &[Post], limit: usize) -> Vec<Post> {
    let mut selected: Vec<Post> = posts.to_vec();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    selected.truncate(limit);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn post(slug: &str, y: i32, m: u32, d: u32) -> Post {
        let date = Local.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let mut p = Post::new(slug.to_string(), date, format!("{}.md", slug));
        p.slug = slug.to_string();
        p
    }

    #[test]
    fn test_empty_input() {
        assert!(select_top_posts(&[], 5).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        let posts = vec![post("a", 2024, 1, 1)];
        assert!(select_top_posts(&posts, 0).is_empty());
    }

    #[test]
    fn test_output_never_exceeds_limit_or_input() {
        let posts = vec![
            post("a", 2024, 1, 1),
            post("b", 2024, 2, 1),
            post("c", 2024, 3, 1),
        ];
        assert_eq!(select_top_posts(&posts, 2).len(), 2);
        assert_eq!(select_top_posts(&posts, 5).len(), 3);
    }

    #[test]
    fn test_sorted_newest_first() {
        let posts = vec![
            post("old", 2022, 5, 1),
            post("new", 2024, 6, 1),
            post("mid", 2023, 1, 15),
        ];
        let selected = select_top_posts(&posts, 5);
        let slugs: Vec<&str> = selected.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
        for pair in selected.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn test_takes_the_most_recent() {
        let mut posts = Vec::new();
        for day in 1..=7 {
            posts.push(post(&format!("p{}", day), 2024, 1, day));
        }
        let selected = select_top_posts(&posts, 5);
        let slugs: Vec<&str> = selected.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["p7", "p6", "p5", "p4", "p3"]);
    }

    #[test]
    fn test_equal_dates_order_by_slug() {
        // Same date in both input orders gives the same output
        let a = post("alpha", 2024, 1, 1);
        let b = post("beta", 2024, 1, 1);

        let forward = select_top_posts(&[a.clone(), b.clone()], 5);
        let reversed = select_top_posts(&[b, a], 5);

        let slugs: Vec<&str> = forward.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "beta"]);
        assert_eq!(
            slugs,
            reversed.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>()
        );
    }
}
