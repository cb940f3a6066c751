//! Built-in classification prompts.

use super::PromptTemplate;
use crate::types::Result;

/// Direct classification: page text in, structured record out.
pub const SINGLE_STAGE: &str = r#"Analyze the bank's website content and categorize it based on:

    Sector: Identify and distinguish the sector within the bank, such as 'Personal Banking',
    'Business Banking', 'Investment Banking', among others.

    Product: Ascertain the specific service or product offered by the bank. This can be 'Checking Accounts',
    'Savings Accounts', 'Credit Cards', various types of 'Loans' (like 'Mortgage Loans', 'Personal Loans',
    'Auto Loans'), 'Investment Services', 'Insurance Products', and more.

    Details: Briefly highlight the specific characteristic or feature of the aforementioned product or service. This
    could involve details like interest rates, fees, benefits, terms and conditions, and other pertinent information.

{format_instructions}

REMEMBER: No more than 4 words for each variable. Don't use names of products or bank in your answer.

Site content:
"{site_content}"

Answer:
"#;

/// Stage A of the two-stage topology: free-text analysis, no schema.
pub const ANALYSIS: &str = r#"You are analyzing a page from a bank's website. Read the content and write a short report with three parts:

    Target audience: Who is the page addressed to? Private individuals, businesses, investors, or another group?

    Product description: Which service or product does the page offer? Name the general category
    (for example a checking account, savings account, credit card, mortgage, personal loan, insurance).

    Product details: Which characteristics of the product does the page emphasize? Interest rates, fees,
    benefits, eligibility, terms and conditions, or other pertinent information.

Write plain prose. Don't use names of products or bank in your report.

Site content:
"{site_content}"

Report:
"#;

/// Stage B of the two-stage topology: classify the stage A report.
pub const CLASSIFICATION_FROM_ANALYSIS: &str = r#"Below is an analysis of a page from a bank's website. Categorize the page based on:

    Sector: The sector within the bank the page belongs to, such as 'Personal Banking', 'Business Banking',
    'Investment Banking', among others.

    Product: The specific service or product offered.

    Details: The specific characteristics or features of that product.

{format_instructions}

REMEMBER: No more than 4 words for each variable. Don't use names of products or bank in your answer.

Content analysis:
"{content_analysis}"

Answer:
"#;

/// Corrective prompt sent once when the answer failed to parse.
pub const REPAIR: &str = r#"Json:
```
{json}
```

Above, the Json is not valid.

{format_instructions}

Please try again:"#;

/// The set of prompts one pipeline instance uses
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    /// Requires `format_instructions`, `site_content`
    pub single_stage: PromptTemplate,
    /// Requires `site_content`
    pub analysis: PromptTemplate,
    /// Requires `format_instructions`, `content_analysis`
    pub classification: PromptTemplate,
    /// Requires `json`, `format_instructions`
    pub repair: PromptTemplate,
}

impl PromptTemplates {
    /// Bank product page prompts
    pub fn bank_site() -> Result<Self> {
        Ok(Self {
            single_stage: PromptTemplate::new(SINGLE_STAGE)?,
            analysis: PromptTemplate::new(ANALYSIS)?,
            classification: PromptTemplate::new(CLASSIFICATION_FROM_ANALYSIS)?,
            repair: PromptTemplate::new(REPAIR)?,
        })
    }
}
