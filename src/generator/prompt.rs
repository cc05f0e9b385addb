//! Prompt templates and response clean-up for the content generator.

use crate::flyer::{FlyerOptions, FlyerType, PrimaryText, parse_details};
use crate::placeholder::Placeholder;

use super::AssetFlags;

/// Instruction sent with "Generate Variation".
pub const VARIATION_INSTRUCTION: &str = "Try a completely different layout and style.";

/// Separator the copywriter prompt asks the model to put between options.
pub const COPY_SEPARATOR: &str = "---";

/// Build the markup-generation prompt.
pub fn flyer_prompt(options: &FlyerOptions, flags: AssetFlags, variation: Option<&str>) -> String {
    let dims = options.dimensions();
    let (width, height) = (dims.width, dims.height);
    let text = PrimaryText::parse(&options.primary_text);
    let details = parse_details(&options.details_block);
    let theme = options.style_theme;
    let primary = &options.primary_color;
    let accent = &options.accent_color;
    let brand = if options.brand_name.trim().is_empty() {
        "Not provided"
    } else {
        options.brand_name.as_str()
    };

    let variation_line = match variation.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!("\n- **Variation Instruction:** {}", v),
        None => String::new(),
    };

    format!(
        r#"You are an expert graphic designer creating professional event flyers using ONLY HTML and Tailwind CSS.

**CRITICAL INSTRUCTIONS:**
1.  **Output Format:** Respond with ONLY the raw HTML code for the flyer's content. Do NOT include `<html>`, `<head>`, `<body>`, or markdown fences like ```html.
2.  **Styling:** Use ONLY Tailwind CSS classes. DO NOT use `<style>` blocks or inline `style="..."` attributes.
3.  **Dimensions:** The root element must be a `div` with classes that ensure it fits the container perfectly: `relative w-[{width}px] h-[{height}px] overflow-hidden`. All content must be inside this div.
4.  **Fonts:** Use common web-safe fonts. Emphasize text using Tailwind's font size (e.g., `text-6xl`, `text-8xl`) and weight utilities (e.g., `font-bold`).
5.  **Text Handling:** Use the exact text provided by the user. Do not rewrite, alter, or add any text. Ensure all provided text is included.
6.  **Image Placeholders:**
    *   Logo: If requested, use this exact placeholder in an `<img>` tag's src: `{logo}`.
    *   Speaker/Promo Image: If requested, use this exact placeholder in an `<img>` tag's src: `{speaker}`.
    *   Background Image: If requested, use this exact placeholder in the `style` attribute of a background div: `background-image: url('{background}')`.
    *   QR Code: If requested, use this exact placeholder in an `<img>` tag's src: `{qr}`.
    *   Never use any other image source, script, or external resource.

**BRANDING & DESIGN RULES:**
1.  **Art Direction / Style:** The design MUST adhere to a '{theme_label}' theme. {theme_description}
2.  **Color Palette:**
    *   Primary Color: `{primary}`
    *   Accent Color: `{accent}`
    *   Use these colors creatively for text, shapes, backgrounds, and highlights.
3.  **Background:**
    *   **If a background image is provided (`hasBackgroundImage: true`):**
        *   Create a `div` with `absolute inset-0 bg-cover bg-center` and the `background-image` style mentioned above.
        *   **CRITICAL:** Place a semi-transparent overlay on top of the image to ensure text is readable. Example: `<div class="absolute inset-0 bg-black/50"></div>`. The overlay color can also be a darkened version of the primary color.
        *   All text on top of the image must be light-colored (`text-white`, `text-gray-200`).
    *   **If NO background image, but a speaker image IS present:** Use a light/white background (`bg-white` or `bg-gray-50`) and use the Primary Color for text, borders, and shapes.
    *   **If NO background image and NO speaker image:** Use the Primary Color (`bg-[{primary}]`) as the main background. Text should be white (`text-white` or light gray), and highlights should use the Accent Color.

**LAYOUT & CONTENT LOGIC:**
1.  **Hierarchy:** The Title must be the most prominent element. The CTA should be a clear, clickable-looking button.
2.  **Details Block & AI Icons:**
    *   Format the 'Details Block' items as a visually appealing list.
    *   **CRITICAL:** For each item (e.g., 'Date: [Date]'), you MUST generate a simple, modern, monochrome SVG icon that visually represents the detail (calendar for date, clock for time, pin for location, etc.).
    *   The SVG icon should be placed immediately before the text. Use these attributes for the SVG: `width="24" height="24" class="inline-block mr-2 align-middle stroke-current"` with other relevant SVG attributes like `fill="none"` and `stroke-width="1.5"`. Ensure the icon style is consistent and matches the overall theme.
    *   Do NOT use emojis.
3.  **QR Code:**
    *   If a QR Code is requested (`hasQrCode: true`), place the `{qr}` image in a sensible location, usually a bottom corner. Give it an appropriate size like `w-24 h-24` or `w-32 h-32` and add a small white border or padding (`p-1 bg-white rounded-md`) to ensure it's scannable on any background.

**FLYER DETAILS:**
- **Flyer Type:** {flyer_type}
- **Topic:** {topic}
- **Style Theme:** {theme_label}
- **Primary Color:** {primary}
- **Accent Color:** {accent}
- **Brand Name:** {brand}
- **Logo Requested:** {has_logo}
- **Speaker Image Requested:** {has_speaker}
- **Background Image Requested:** {has_background}
- **QR Code Requested:** {has_qr}
- **Primary Text:** Title: {title}, Subtitle: {subtitle}, Supporting: {support1}, {support2}
- **Details Block Items:** {details}
- **CTA Text:** {cta}{variation_line}

Generate the HTML code now."#,
        logo = Placeholder::Logo.token(),
        speaker = Placeholder::Speaker.token(),
        background = Placeholder::Background.token(),
        qr = Placeholder::Qr.token(),
        theme_label = theme.label(),
        theme_description = theme.description(),
        flyer_type = options.flyer_type.label(),
        topic = options.topic,
        has_logo = flags.logo,
        has_speaker = flags.speaker,
        has_background = flags.background,
        has_qr = flags.qr,
        title = text.title,
        subtitle = text.subtitle,
        support1 = text.support1,
        support2 = text.support2,
        details = details.join(", "),
        cta = options.cta_text,
    )
}

/// Build the copywriter prompt for primary-text suggestions.
pub fn copy_prompt(flyer_type: FlyerType, topic: &str) -> String {
    format!(
        r#"You are a professional copywriter. Your task is to generate 3 catchy and concise 'Primary Text' options for a flyer.

**Flyer Details:**
- **Type:** {flyer_type}
- **Topic:** {topic}

**CRITICAL INSTRUCTIONS:**
1.  Generate exactly 3 distinct options.
2.  Format EACH option as a single line with four parts separated by semicolons: `Title;Subtitle;Supporting Line 1;Supporting Line 2`.
3.  Use the placeholder `[Name]` or `[Detail]` for specifics that you don't know.
4.  Separate the 3 options from each other with `{sep}`.
5.  Do NOT add any other text, explanation, or markdown formatting.

**Example Output:**
Unlock Your Potential;A Masterclass on Public Speaking;With Expert [Name];Limited Seats Available
{sep}
Speak with Confidence;Transform Your Career in 90 Minutes;Learn from the Best;[Date] & [Time]
{sep}
The Art of Persuasion;Master Public Speaking Today;Hosted by [Your Brand];Register Now"#,
        flyer_type = flyer_type.label(),
        topic = topic.trim(),
        sep = COPY_SEPARATOR,
    )
}

/// Build the prompt asking for a background-image prompt.
pub fn image_prompt_suggestion(topic: &str) -> String {
    format!(
        r#"Based on the flyer topic "{topic}", generate one creative, concise, and visually descriptive prompt for an AI image generator to create a background image.
The prompt should focus on abstract concepts, textures, or artistic styles rather than specific people or text.
Do not add any explanation or preamble. Respond with only the prompt.

Example for topic "AI & The Future of Design":
Abstract network of glowing neural pathways and geometric shapes, dark blue and purple background"#,
        topic = topic.trim(),
    )
}

/// Remove a leading ```` ```html ```` fence and a trailing ```` ``` ```` fence.
pub fn strip_fences(text: &str) -> String {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```html") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim().to_string()
}

/// Split a copywriter response into individual options.
pub fn split_copy_variants(text: &str) -> Vec<String> {
    text.trim()
        .split(COPY_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
