use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    #[serde(skip_serializing_if = "has_no_children")]
    pub children: &'static [NavLink],
}

fn has_no_children(children: &&[NavLink]) -> bool {
    children.is_empty()
}

impl NavLink {
    const fn leaf(label: &'static str, href: &'static str) -> Self {
        Self {
            label,
            href,
            children: &[],
        }
    }

    /// True when `path` is this link or sits underneath it.
    pub fn is_active(&self, path: &str) -> bool {
        if self.href == "/" {
            return path == "/";
        }
        path == self.href
            || path
                .strip_prefix(self.href)
                .is_some_and(|rest| rest.starts_with('/'))
            || self.children.iter().any(|c| c.is_active(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FooterSection {
    pub title: &'static str,
    pub links: &'static [NavLink],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: &'static str,
    pub nmls_id: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    pub address: &'static str,
    pub disclaimer: &'static str,
}

pub const COMPANY: CompanyInfo = CompanyInfo {
    name: "Harborline Mortgage",
    nmls_id: "2045817",
    phone: "(555) 013-4400",
    email: "loans@harborline.example",
    address: "400 Commerce Way, Suite 210, Norfolk, VA 23510",
    disclaimer: "Calculator results are estimates for illustration only and are not a loan \
                 offer or commitment to lend. Rates, fees and program rules are subject to \
                 change and to credit approval.",
};

pub static HEADER_LINKS: &[NavLink] = &[
    NavLink::leaf("Home", "/"),
    NavLink {
        label: "Loan Options",
        href: "/loan-options",
        children: &[
            NavLink::leaf("Conventional", "/loan-options/conventional"),
            NavLink::leaf("FHA", "/loan-options/fha"),
            NavLink::leaf("VA Purchase", "/loan-options/va-purchase"),
            NavLink::leaf("VA Streamline", "/loan-options/va-irrrl"),
            NavLink::leaf("USDA", "/loan-options/usda"),
            NavLink::leaf("DSCR Investment", "/loan-options/dscr"),
            NavLink::leaf("Jumbo", "/loan-options/jumbo"),
        ],
    },
    NavLink {
        label: "Calculators",
        href: "/calculators",
        children: &[
            NavLink::leaf("Affordability", "/calculators/affordability"),
            NavLink::leaf("VA Purchase", "/calculators/va-purchase"),
            NavLink::leaf("VA Refinance", "/calculators/va-refinance"),
            NavLink::leaf("DSCR", "/calculators/dscr"),
        ],
    },
    NavLink::leaf("Blog", "/blog"),
];

pub static FOOTER_SECTIONS: &[FooterSection] = &[
    FooterSection {
        title: "Loans",
        links: &[
            NavLink::leaf("Conventional", "/loan-options/conventional"),
            NavLink::leaf("FHA", "/loan-options/fha"),
            NavLink::leaf("VA", "/loan-options/va-purchase"),
            NavLink::leaf("DSCR", "/loan-options/dscr"),
        ],
    },
    FooterSection {
        title: "Tools",
        links: &[
            NavLink::leaf("Affordability", "/calculators/affordability"),
            NavLink::leaf("VA Purchase", "/calculators/va-purchase"),
            NavLink::leaf("VA Refinance", "/calculators/va-refinance"),
            NavLink::leaf("DSCR", "/calculators/dscr"),
        ],
    },
    FooterSection {
        title: "Learn",
        links: &[
            NavLink::leaf("Blog", "/blog"),
            NavLink::leaf("All Loan Options", "/loan-options"),
        ],
    },
];

pub fn header_links() -> &'static [NavLink] {
    HEADER_LINKS
}

pub fn footer_sections() -> &'static [FooterSection] {
    FOOTER_SECTIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{find_loan_option, loan_options};
    use crate::core::Calculator;

    fn all_hrefs() -> Vec<&'static str> {
        let header = HEADER_LINKS
            .iter()
            .flat_map(|l| std::iter::once(l).chain(l.children.iter()));
        let footer = FOOTER_SECTIONS.iter().flat_map(|s| s.links.iter());
        header.chain(footer).map(|l| l.href).collect()
    }

    #[test]
    fn every_link_points_at_a_known_page() {
        for href in all_hrefs() {
            let known = match href.split('/').collect::<Vec<_>>().as_slice() {
                ["", ""] | ["", "loan-options"] | ["", "calculators"] | ["", "blog"] => true,
                ["", "loan-options", slug] => find_loan_option(slug).is_some(),
                ["", "calculators", slug] => Calculator::from_slug(slug).is_some(),
                _ => false,
            };
            assert!(known, "dangling link {href}");
        }
    }

    #[test]
    fn loan_options_menu_lists_every_option() {
        let menu = HEADER_LINKS
            .iter()
            .find(|l| l.href == "/loan-options")
            .expect("menu");
        assert_eq!(menu.children.len(), loan_options().len());
    }

    #[test]
    fn active_state_follows_the_path() {
        let home = &HEADER_LINKS[0];
        assert!(home.is_active("/"));
        assert!(!home.is_active("/blog"));
        let blog = HEADER_LINKS.iter().find(|l| l.href == "/blog").expect("blog");
        assert!(blog.is_active("/blog/fha-vs-conventional"));
        assert!(!blog.is_active("/blogroll"));
    }
}
