pub mod blog;
pub mod forms;
pub mod loan_options;
pub mod navigation;
pub mod pages;

pub use blog::{
    BlogCategory, BlogPost, BlogPostSummary, blog_posts, find_post, posts_in_category,
    posts_newest_first, related_posts,
};
pub use forms::{FieldKind, FormField, calculator_form};
pub use loan_options::{LoanOption, find_loan_option, loan_options, options_for_calculator};
pub use navigation::{COMPANY, CompanyInfo, FooterSection, NavLink, footer_sections, header_links};
