use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlogCategory {
    HomeBuying,
    VaLoans,
    Refinancing,
    Investing,
}

impl BlogCategory {
    pub const ALL: [BlogCategory; 4] = [
        BlogCategory::HomeBuying,
        BlogCategory::VaLoans,
        BlogCategory::Refinancing,
        BlogCategory::Investing,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            BlogCategory::HomeBuying => "home-buying",
            BlogCategory::VaLoans => "va-loans",
            BlogCategory::Refinancing => "refinancing",
            BlogCategory::Investing => "investing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlogCategory::HomeBuying => "Home Buying",
            BlogCategory::VaLoans => "VA Loans",
            BlogCategory::Refinancing => "Refinancing",
            BlogCategory::Investing => "Investing",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogPost {
    pub slug: &'static str,
    pub title: &'static str,
    /// ISO `YYYY-MM-DD`.
    pub date: &'static str,
    pub author: &'static str,
    pub category: BlogCategory,
    pub summary: &'static str,
    pub paragraphs: &'static [&'static str],
    pub tags: &'static [&'static str],
}

impl BlogPost {
    pub fn published(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date, "%Y-%m-%d").ok()
    }

    /// "March 4, 2024"; falls back to the raw date string.
    pub fn display_date(&self) -> String {
        self.published()
            .map(|d| d.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.date.to_string())
    }

    pub fn path(&self) -> String {
        format!("/blog/{}", self.slug)
    }

    /// Rough reading time at 200 words per minute, never below one minute.
    pub fn reading_minutes(&self) -> usize {
        let words: usize = self
            .paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum();
        words.div_ceil(200).max(1)
    }

    fn shared_tags(&self, other: &BlogPost) -> usize {
        self.tags.iter().filter(|t| other.tags.contains(t)).count()
    }
}

/// Listing shape for `/api/blog`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostSummary {
    pub slug: &'static str,
    pub title: &'static str,
    pub date: &'static str,
    pub display_date: String,
    pub author: &'static str,
    pub category: BlogCategory,
    pub summary: &'static str,
    pub tags: &'static [&'static str],
    pub reading_minutes: usize,
}

impl From<&BlogPost> for BlogPostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            slug: post.slug,
            title: post.title,
            date: post.date,
            display_date: post.display_date(),
            author: post.author,
            category: post.category,
            summary: post.summary,
            tags: post.tags,
            reading_minutes: post.reading_minutes(),
        }
    }
}

pub static BLOG_POSTS: &[BlogPost] = &[
    BlogPost {
        slug: "how-much-house-can-i-afford",
        title: "How Much House Can I Afford?",
        date: "2024-01-15",
        author: "Dana Whitfield",
        category: BlogCategory::HomeBuying,
        summary: "Lenders look at two debt-to-income ratios. Here is how they turn your \
                  income into a maximum purchase price.",
        paragraphs: &[
            "Before you tour a single home, it helps to know the price range a lender will \
             approve. Underwriters start from your gross monthly income and apply two limits: \
             the front-end ratio, which caps the housing payment, and the back-end ratio, \
             which caps housing plus every other monthly debt.",
            "A conventional loan typically allows 28% and 36%. FHA stretches to 31% and 43%, \
             while VA loans look mainly at a single 41% ratio. Whichever limit is tighter \
             sets your maximum payment.",
            "That payment has to cover more than principal and interest. Property taxes, \
             homeowners insurance, HOA dues and any mortgage insurance all come out of the \
             same budget, so a higher tax rate lowers the price you can afford.",
            "Our affordability calculator works backwards from those limits to the largest \
             price whose full payment still fits.",
        ],
        tags: &["affordability", "dti", "first-time-buyers"],
    },
    BlogPost {
        slug: "fha-vs-conventional",
        title: "FHA vs. Conventional: Which Loan Fits You?",
        date: "2024-02-20",
        author: "Marcus Bell",
        category: BlogCategory::HomeBuying,
        summary: "Mortgage insurance is the biggest difference between the two. We compare \
                  the costs side by side.",
        paragraphs: &[
            "FHA loans accept lower credit scores and only 3.5% down, but every FHA borrower \
             pays a 1.75% upfront premium plus an annual premium that usually lasts for the \
             life of the loan.",
            "Conventional loans charge private mortgage insurance only when you put down less \
             than 20%, and the rate falls as your loan-to-value improves. Once you reach 20% \
             equity you can ask to have it removed.",
            "If your credit is strong, conventional financing is usually cheaper over time. \
             If your score or debt ratios are borderline, FHA may be the only path to approval.",
        ],
        tags: &["fha", "conventional", "mortgage-insurance", "first-time-buyers"],
    },
    BlogPost {
        slug: "va-funding-fee-explained",
        title: "The VA Funding Fee, Explained",
        date: "2024-03-04",
        author: "Dana Whitfield",
        category: BlogCategory::VaLoans,
        summary: "What the funding fee costs, when it is waived and how your down payment \
                  changes it.",
        paragraphs: &[
            "VA loans do not carry monthly mortgage insurance. Instead, the VA charges a one-time \
             funding fee that keeps the program self-sustaining.",
            "For a first-time purchase with less than 5% down the fee is 2.15% of the loan. \
             Putting 5% down lowers it to 1.5%, and 10% down lowers it to 1.25%. Subsequent \
             use without a down payment costs 3.3%.",
            "Veterans who receive compensation for a service-connected disability are exempt. \
             Most borrowers finance the fee into the loan rather than paying it at closing.",
        ],
        tags: &["va", "funding-fee", "veterans"],
    },
    BlogPost {
        slug: "va-irrrl-when-to-refinance",
        title: "When Does a VA Streamline Refinance Make Sense?",
        date: "2024-04-18",
        author: "Marcus Bell",
        category: BlogCategory::Refinancing,
        summary: "Use the break-even point to decide whether a lower rate is worth the closing \
                  costs.",
        paragraphs: &[
            "An Interest Rate Reduction Refinance Loan swaps your current VA loan for one with a \
             lower rate. The funding fee is only 0.5% and there is usually no appraisal.",
            "The key number is the break-even point: closing costs divided by monthly savings. \
             If you expect to stay in the home longer than that, the refinance pays for itself.",
            "Watch the term, too. Restarting a 30-year clock can lower the payment while raising \
             the total interest you pay.",
        ],
        tags: &["va", "irrrl", "refinance", "veterans"],
    },
    BlogPost {
        slug: "dscr-loans-for-investors",
        title: "DSCR Loans: Qualifying on Rental Income",
        date: "2024-05-09",
        author: "Priya Raman",
        category: BlogCategory::Investing,
        summary: "How lenders compute the debt service coverage ratio and what score you need.",
        paragraphs: &[
            "A DSCR loan ignores your personal income. The lender divides the property's net \
             operating income by its monthly principal and interest.",
            "A ratio of 1.25 or higher is considered strong and earns the best pricing. At 1.0 \
             the rent exactly covers the payment, which most lenders still accept. Between 0.75 \
             and 1.0 some lenders will lend with a larger down payment.",
            "Vacancy and expenses matter. A property that looks great at full occupancy can fall \
             below 1.0 once you budget for a month or two of turnover.",
        ],
        tags: &["dscr", "investing", "rental-property"],
    },
    BlogPost {
        slug: "cash-out-refinance-for-investors",
        title: "Using a Cash-Out Refinance to Buy Your Next Rental",
        date: "2024-06-27",
        author: "Priya Raman",
        category: BlogCategory::Investing,
        summary: "Tapping equity can fund a down payment, but the new payment has to work for \
                  both properties.",
        paragraphs: &[
            "A cash-out refinance replaces your mortgage with a larger one and pays you the \
             difference. Investors often use it to fund the next down payment.",
            "Before you borrow, run the numbers on the new payment and the rental you plan to \
             buy. Both need to cash flow after vacancy and expenses.",
        ],
        tags: &["refinance", "investing", "cash-out"],
    },
];

pub fn blog_posts() -> &'static [BlogPost] {
    BLOG_POSTS
}

/// Newest first; posts with unparseable dates sort last.
pub fn posts_newest_first() -> Vec<&'static BlogPost> {
    let mut posts: Vec<&BlogPost> = BLOG_POSTS.iter().collect();
    posts.sort_by_key(|p| Reverse(p.published()));
    posts
}

pub fn find_post(slug: &str) -> Option<&'static BlogPost> {
    BLOG_POSTS.iter().find(|p| p.slug == slug)
}

pub fn posts_in_category(category: BlogCategory) -> Vec<&'static BlogPost> {
    posts_newest_first()
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}

/// Other posts ranked by shared tags, then same category, then recency.
pub fn related_posts(post: &BlogPost, limit: usize) -> Vec<&'static BlogPost> {
    let mut candidates: Vec<(usize, bool, &BlogPost)> = posts_newest_first()
        .into_iter()
        .filter(|p| p.slug != post.slug)
        .map(|p| (post.shared_tags(p), p.category == post.category, p))
        .filter(|(shared, same_category, _)| *shared > 0 || *same_category)
        .collect();
    // Stable sort keeps newest-first order among ties.
    candidates.sort_by_key(|(shared, same_category, _)| Reverse((*shared, *same_category)));
    candidates.into_iter().take(limit).map(|(_, _, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_post_has_a_valid_date_and_unique_slug() {
        for post in blog_posts() {
            assert!(post.published().is_some(), "{} has a bad date", post.slug);
            assert_eq!(find_post(post.slug), Some(post));
            assert!(!post.paragraphs.is_empty());
        }
    }

    #[test]
    fn listing_is_newest_first() {
        let posts = posts_newest_first();
        assert_eq!(posts.len(), BLOG_POSTS.len());
        assert!(posts.windows(2).all(|w| w[0].published() >= w[1].published()));
        assert_eq!(posts[0].slug, "cash-out-refinance-for-investors");
    }

    #[test]
    fn display_date_is_long_form() {
        let post = find_post("va-funding-fee-explained").expect("post");
        assert_eq!(post.display_date(), "March 4, 2024");
    }

    #[test]
    fn category_filter_and_slugs() {
        let investing = posts_in_category(BlogCategory::Investing);
        assert_eq!(investing.len(), 2);
        assert!(investing.iter().all(|p| p.category == BlogCategory::Investing));
        assert_eq!(BlogCategory::from_slug("va-loans"), Some(BlogCategory::VaLoans));
        assert_eq!(BlogCategory::from_slug("crypto"), None);
    }

    #[test]
    fn related_posts_prefer_shared_tags() {
        let post = find_post("va-funding-fee-explained").expect("post");
        let related = related_posts(post, 3);
        let slugs: Vec<&str> = related.iter().map(|p| p.slug).collect();
        assert_eq!(slugs, ["va-irrrl-when-to-refinance"]);

        let post = find_post("dscr-loans-for-investors").expect("post");
        let related = related_posts(post, 1);
        assert_eq!(related[0].slug, "cash-out-refinance-for-investors");
    }

    #[test]
    fn reading_time_is_at_least_a_minute() {
        assert!(blog_posts().iter().all(|p| p.reading_minutes() >= 1));
    }
}
