use nl_core::Article;

/// The fixed fallback set returned when the search collaborator is
/// unreachable or comes back empty. The news list must never be empty.
pub fn fallback_news() -> Vec<Article> {
    vec![
        Article {
            title: "AI Breakthrough in Climate Modeling".to_string(),
            url: Some("https://example.com/ai-climate".to_string()),
            source: "TechDaily".to_string(),
            body: "Scientists have developed a new AI model that predicts climate patterns with unprecedented accuracy...".to_string(),
            image: "https://picsum.photos/seed/climate/800/600".to_string(),
            date: "Recently".to_string(),
        },
        Article {
            title: "Global Markets Rally on Tech Earnings".to_string(),
            url: Some("https://example.com/markets-rally".to_string()),
            source: "FinanceWorld".to_string(),
            body: "Major tech companies reported record earnings this quarter, driving a global stock market rally...".to_string(),
            image: "https://picsum.photos/seed/markets/800/600".to_string(),
            date: "Recently".to_string(),
        },
        Article {
            title: "New Mars Rover Sends Stunning Images".to_string(),
            url: Some("https://example.com/mars-rover".to_string()),
            source: "SpaceNews".to_string(),
            body: "The latest rover to land on Mars has sent back high-resolution images of the red planet's surface...".to_string(),
            image: "https://picsum.photos/seed/mars/800/600".to_string(),
            date: "Recently".to_string(),
        },
        Article {
            title: "The Future of Electric Vehicles".to_string(),
            url: Some("https://example.com/ev-future".to_string()),
            source: "AutoTrends".to_string(),
            body: "Electric vehicle adoption is accelerating as battery technology improves and costs come down...".to_string(),
            image: "https://picsum.photos/seed/ev/800/600".to_string(),
            date: "Recently".to_string(),
        },
    ]
}
