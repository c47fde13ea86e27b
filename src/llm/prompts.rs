//! Prompt templates for the text-interpretation calls.
//!
//! Templates use `{text}`, `{language}` and `{description}` placeholders
//! filled in by the client.

pub const EXTRACT_FIELDS_PROMPT: &str = "Extract key fields (price, name, category, stock, date, location, etc.) \
     from the following text. Respond with a JSON object where any missing \
     fields have empty strings.\n{text}";

pub const CLASSIFY_PROMPT: &str = "Classify the following text into one of the categories: product, advert, \
     article, spam. Respond with the single category word.\n{text}";

pub const TRANSLATE_PROMPT: &str = "Translate the following text into {language}:\n{text}";

pub const NORMALIZE_DATE_PROMPT: &str = "Normalise the following date or time expression to ISO YYYY-MM-DD \
     format. If no date is detected return an empty string.\n{text}";

pub const SUGGEST_SELECTOR_PROMPT: &str = "Given the description of a web page element or repeated pattern, \
     suggest a robust CSS selector or XPath that would match it.\n{description}";
