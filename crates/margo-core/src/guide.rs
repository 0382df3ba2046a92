//! The annotation guide: a two-level codebook of themes and codes.
//!
//! The guide itself and every theme and code in it are persisted as
//! annotations on the group's own page, distinguished from document
//! annotations by their structural tags:
//!
//! - guide:  `oa:guide`
//! - theme:  `oa:theme:<name>`
//! - code:   `oa:code:<name>` plus `oa:isCodeOf:<theme name>`
//!
//! Bodies are YAML. Reassembling a guide from its annotations is tolerant:
//! malformed entries are logged and skipped, never fatal.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::{distinct_colors, Color};
use crate::defaults::{
    GROUP_NAME, GUIDE_TAG, MAX_ALPHA, MIN_ALPHA, TAG_GROUP, TAG_NAMESPACE, TAG_RELATION,
    TAG_SUBGROUP,
};
use crate::models::{
    Annotation, AnnotationPayload, DocumentInfo, Group, Motivation, Permissions,
};

/// Tag marking a theme annotation (`oa:theme:<name>`).
pub fn theme_tag(name: &str) -> String {
    format!("{TAG_NAMESPACE}:{TAG_GROUP}:{name}")
}

/// Tag marking a code annotation (`oa:code:<name>`).
pub fn code_tag(name: &str) -> String {
    format!("{TAG_NAMESPACE}:{TAG_SUBGROUP}:{name}")
}

/// Tag linking a code to its parent theme (`oa:isCodeOf:<theme name>`).
pub fn relation_tag(theme_name: &str) -> String {
    format!("{TAG_NAMESPACE}:{TAG_RELATION}:{theme_name}")
}

fn tag_value<'a>(tags: &'a [String], prefix: &str) -> Option<&'a str> {
    tags.iter().find_map(|t| t.strip_prefix(prefix))
}

/// URI of a group's activity page, where codebook annotations live.
pub fn group_uri(group: &Group) -> String {
    group
        .links
        .html
        .clone()
        .unwrap_or_else(|| format!("https://hypothes.is/groups/{}", group.id))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GuideBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntryBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Parse a YAML annotation body, treating an empty body as the default.
fn parse_body<T: Default + for<'de> Deserialize<'de>>(text: &str) -> Option<T> {
    if text.trim().is_empty() {
        return Some(T::default());
    }
    match serde_yaml::from_str(text) {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(error = %e, "Skipping codebook annotation with malformed body");
            None
        }
    }
}

fn dump_body<T: Serialize>(body: &T) -> String {
    serde_yaml::to_string(body).unwrap_or_default()
}

// =============================================================================
// CODE
// =============================================================================

/// A code: the finer-grained unit of the codebook, always belonging to a
/// theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    /// Store id of the backing annotation, once persisted.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// Name of the owning theme, carried so the relation tag can be built
    /// without a parent reference.
    pub theme_name: String,
    /// Derived from the theme color; assigned by the owning theme.
    pub color: Option<Color>,
}

impl Code {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        theme_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            theme_name: theme_name.into(),
            color: None,
        }
    }

    /// Tags a document annotation classified with this code carries.
    pub fn annotation_tags(&self) -> Vec<String> {
        vec![code_tag(&self.name), relation_tag(&self.theme_name)]
    }

    /// Payload persisting this code into the group's codebook.
    pub fn to_payload(&self, group: &Group, creator: &str) -> AnnotationPayload {
        AnnotationPayload {
            context: crate::defaults::ANNOTATION_CONTEXT.to_string(),
            group: group.id.clone(),
            creator: creator.to_string(),
            document: DocumentInfo::default(),
            document_metadata: None,
            permissions: Permissions::group_read(&group.id),
            references: vec![],
            motivation: Motivation::CodebookDevelopment,
            tags: vec![
                code_tag(&self.name),
                relation_tag(&self.theme_name),
                Motivation::CodebookDevelopment.as_tag(),
            ],
            target: vec![],
            text: dump_body(&EntryBody {
                description: Some(self.description.clone()),
            }),
            uri: group_uri(group),
        }
    }

    /// Rebuild a code from its annotation. The parent theme is resolved by
    /// the guide, not here.
    pub fn from_annotation(annotation: &Annotation) -> Option<Self> {
        let name = tag_value(&annotation.tags, &format!("{TAG_NAMESPACE}:{TAG_SUBGROUP}:"))?;
        let theme_name =
            match tag_value(&annotation.tags, &format!("{TAG_NAMESPACE}:{TAG_RELATION}:")) {
                Some(t) => t,
                None => {
                    debug!(code = name, "Code annotation carries no theme relation tag");
                    return None;
                }
            };
        let body: EntryBody = parse_body(&annotation.text)?;
        Some(Self {
            id: Some(annotation.id.clone()),
            name: name.to_string(),
            description: body.description.unwrap_or_default(),
            theme_name: theme_name.to_string(),
            color: None,
        })
    }
}

// =============================================================================
// THEME
// =============================================================================

/// A theme: the top-level unit of the codebook, holding zero or more codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub color: Option<Color>,
    pub codes: Vec<Code>,
}

impl Theme {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            color: None,
            codes: Vec::new(),
        }
    }

    /// Tags a document annotation classified with this theme carries.
    pub fn annotation_tags(&self) -> Vec<String> {
        vec![theme_tag(&self.name)]
    }

    pub fn to_payload(&self, group: &Group, creator: &str) -> AnnotationPayload {
        AnnotationPayload {
            context: crate::defaults::ANNOTATION_CONTEXT.to_string(),
            group: group.id.clone(),
            creator: creator.to_string(),
            document: DocumentInfo::default(),
            document_metadata: None,
            permissions: Permissions::group_read(&group.id),
            references: vec![],
            motivation: Motivation::CodebookDevelopment,
            tags: vec![
                theme_tag(&self.name),
                Motivation::CodebookDevelopment.as_tag(),
            ],
            target: vec![],
            text: dump_body(&EntryBody {
                description: Some(self.description.clone()),
            }),
            uri: group_uri(group),
        }
    }

    /// Payloads for this theme and all of its codes.
    pub fn to_payloads(&self, group: &Group, creator: &str) -> Vec<AnnotationPayload> {
        let mut payloads = vec![self.to_payload(group, creator)];
        payloads.extend(self.codes.iter().map(|c| c.to_payload(group, creator)));
        payloads
    }

    pub fn from_annotation(annotation: &Annotation) -> Option<Self> {
        let name = tag_value(&annotation.tags, &format!("{TAG_NAMESPACE}:{TAG_GROUP}:"))?;
        let body: EntryBody = parse_body(&annotation.text)?;
        Some(Self {
            id: Some(annotation.id.clone()),
            name: name.to_string(),
            description: body.description.unwrap_or_default(),
            color: None,
            codes: Vec::new(),
        })
    }

    pub fn find_code(&self, name: &str) -> Option<&Code> {
        self.codes.iter().find(|c| c.name == name)
    }

    /// Append a code and recompute the alpha gradient across all codes.
    pub fn add_code(&mut self, mut code: Code) {
        code.theme_name = self.name.clone();
        self.codes.push(code);
        self.reload_colors_for_codes();
    }

    /// Remove a code by name and recompute the alpha gradient.
    pub fn remove_code(&mut self, name: &str) {
        self.codes.retain(|c| c.name != name);
        self.reload_colors_for_codes();
    }

    /// Spread the codes of this theme across the alpha range, darkest last.
    ///
    /// Code `j` of `n` gets alpha `(max - min) / n * (j + 1) + min`, so a
    /// single code sits at the maximum and a long code list fans out evenly
    /// above the theme's own alpha.
    pub fn reload_colors_for_codes(&mut self) {
        let Some(base) = self.color else { return };
        let n = self.codes.len();
        for (j, code) in self.codes.iter_mut().enumerate() {
            let alpha = (MAX_ALPHA - MIN_ALPHA) / n as f32 * (j as f32 + 1.0) + MIN_ALPHA;
            code.color = Some(base.with_alpha(alpha));
        }
    }
}

// =============================================================================
// GUIDE
// =============================================================================

/// A reference to either a theme or one of its codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CodebookEntry<'a> {
    Theme(&'a Theme),
    Code(&'a Code),
}

impl<'a> CodebookEntry<'a> {
    pub fn name(&self) -> &str {
        match self {
            CodebookEntry::Theme(t) => &t.name,
            CodebookEntry::Code(c) => &c.name,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            CodebookEntry::Theme(t) => t.color,
            CodebookEntry::Code(c) => c.color,
        }
    }

    /// Tags a document annotation classified with this entry carries.
    pub fn annotation_tags(&self) -> Vec<String> {
        match self {
            CodebookEntry::Theme(t) => t.annotation_tags(),
            CodebookEntry::Code(c) => c.annotation_tags(),
        }
    }
}

/// Plain definition of a codebook, loadable from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideDefinition {
    pub name: String,
    #[serde(default)]
    pub themes: Vec<ThemeDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub codes: Vec<CodeDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The codebook for one group: a named guide holding themes with codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationGuide {
    pub id: Option<String>,
    pub name: String,
    pub themes: Vec<Theme>,
}

impl AnnotationGuide {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            themes: Vec::new(),
        }
    }

    /// Build a guide from a plain definition and assign its palette.
    pub fn from_definition(definition: &GuideDefinition) -> Self {
        let mut guide = Self::new(definition.name.clone());
        for theme_def in &definition.themes {
            let mut theme = Theme::new(theme_def.name.clone(), theme_def.description.clone());
            for code_def in &theme_def.codes {
                theme.codes.push(Code::new(
                    code_def.name.clone(),
                    code_def.description.clone(),
                    theme_def.name.clone(),
                ));
            }
            guide.themes.push(theme);
        }
        guide.assign_colors();
        guide
    }

    /// Payload persisting the guide marker annotation itself.
    pub fn to_payload(&self, group: &Group, creator: &str) -> AnnotationPayload {
        AnnotationPayload {
            context: crate::defaults::ANNOTATION_CONTEXT.to_string(),
            group: group.id.clone(),
            creator: creator.to_string(),
            document: DocumentInfo::default(),
            document_metadata: None,
            permissions: Permissions::group_read(&group.id),
            references: vec![],
            motivation: Motivation::Defining,
            tags: vec![Motivation::Defining.as_tag(), GUIDE_TAG.to_string()],
            target: vec![],
            text: dump_body(&GuideBody {
                name: Some(self.name.clone()),
            }),
            uri: group_uri(group),
        }
    }

    /// Payloads for the guide and its entire codebook, guide first.
    pub fn to_payloads(&self, group: &Group, creator: &str) -> Vec<AnnotationPayload> {
        let mut payloads = vec![self.to_payload(group, creator)];
        for theme in &self.themes {
            payloads.extend(theme.to_payloads(group, creator));
        }
        payloads
    }

    /// Reassemble a guide from the annotations of a group's page.
    ///
    /// Requires exactly one guide marker annotation. Codes whose relation
    /// tag names no known theme are logged and dropped. Colors are assigned
    /// deterministically from the reassembled theme order.
    pub fn from_annotations(annotations: &[Annotation]) -> Option<Self> {
        let guide_annotations: Vec<&Annotation> = annotations
            .iter()
            .filter(|a| a.tags.iter().any(|t| t == GUIDE_TAG))
            .collect();
        let guide_annotation = match guide_annotations.as_slice() {
            [single] => *single,
            [] => return None,
            many => {
                warn!(
                    count = many.len(),
                    "Multiple guide annotations in group, refusing to pick one"
                );
                return None;
            }
        };

        let body: GuideBody = parse_body(&guide_annotation.text)?;
        let mut guide = Self {
            id: Some(guide_annotation.id.clone()),
            name: body.name.unwrap_or_else(|| GROUP_NAME.to_string()),
            themes: Vec::new(),
        };

        let theme_prefix = format!("{TAG_NAMESPACE}:{TAG_GROUP}:");
        let code_prefix = format!("{TAG_NAMESPACE}:{TAG_SUBGROUP}:");

        for annotation in annotations {
            if annotation.tags.iter().any(|t| t.starts_with(&theme_prefix)) {
                if let Some(theme) = Theme::from_annotation(annotation) {
                    guide.themes.push(theme);
                }
            }
        }
        for annotation in annotations {
            if !annotation.tags.iter().any(|t| t.starts_with(&code_prefix)) {
                continue;
            }
            let Some(code) = Code::from_annotation(annotation) else {
                continue;
            };
            match guide.themes.iter_mut().find(|t| t.name == code.theme_name) {
                Some(theme) => theme.codes.push(code),
                None => debug!(code = %code.name, theme = %code.theme_name, "Code has no theme"),
            }
        }

        guide.assign_colors();
        Some(guide)
    }

    /// Find a theme or code by its backing annotation id.
    pub fn get_entry(&self, id: &str) -> Option<CodebookEntry<'_>> {
        if let Some(theme) = self.themes.iter().find(|t| t.id.as_deref() == Some(id)) {
            return Some(CodebookEntry::Theme(theme));
        }
        for theme in &self.themes {
            if let Some(code) = theme.codes.iter().find(|c| c.id.as_deref() == Some(id)) {
                return Some(CodebookEntry::Code(code));
            }
        }
        None
    }

    pub fn find_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// Resolve a document annotation's tags to the entry it is classified
    /// with. A code tag wins over a theme tag when both are present.
    pub fn entry_for_tags(&self, tags: &[String]) -> Option<CodebookEntry<'_>> {
        if let Some(code_name) = tag_value(tags, &format!("{TAG_NAMESPACE}:{TAG_SUBGROUP}:")) {
            for theme in &self.themes {
                if let Some(code) = theme.find_code(code_name) {
                    return Some(CodebookEntry::Code(code));
                }
            }
        }
        let theme_name = tag_value(tags, &format!("{TAG_NAMESPACE}:{TAG_GROUP}:"))?;
        self.find_theme(theme_name).map(CodebookEntry::Theme)
    }

    /// Append a theme, giving it the next color of the grown palette.
    ///
    /// Existing themes keep their colors until the next full reload.
    pub fn add_theme(&mut self, mut theme: Theme) {
        let mut colors = distinct_colors(self.themes.len() + 1);
        if let Some(last) = colors.pop() {
            theme.color = Some(last.with_alpha(MIN_ALPHA));
        }
        theme.reload_colors_for_codes();
        self.themes.push(theme);
    }

    pub fn remove_theme(&mut self, name: &str) {
        self.themes.retain(|t| t.name != name);
    }

    /// Assign the full palette: evenly spaced hues per theme at the minimum
    /// alpha, then the alpha gradient across each theme's codes.
    pub fn assign_colors(&mut self) {
        let colors = distinct_colors(self.themes.len());
        for (theme, color) in self.themes.iter_mut().zip(colors) {
            theme.color = Some(color.with_alpha(MIN_ALPHA));
            theme.reload_colors_for_codes();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group() -> Group {
        Group {
            id: "g1".to_string(),
            name: GROUP_NAME.to_string(),
            links: crate::models::GroupLinks {
                html: Some("https://hypothes.is/groups/g1".to_string()),
            },
        }
    }

    fn annotation(id: &str, tags: Vec<&str>, text: &str) -> Annotation {
        Annotation {
            id: id.to_string(),
            uri: "https://hypothes.is/groups/g1".to_string(),
            user: "acct:alice@hypothes.is".to_string(),
            text: text.to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            group: "g1".to_string(),
            created: Utc::now(),
            updated: Utc::now(),
            references: vec![],
            target: vec![],
            permissions: None,
            document_metadata: None,
            motivation: None,
        }
    }

    fn sample_guide() -> AnnotationGuide {
        AnnotationGuide::from_definition(&GuideDefinition {
            name: "Interview study".to_string(),
            themes: vec![
                ThemeDefinition {
                    name: "Methodology".to_string(),
                    description: "How the work was done".to_string(),
                    codes: vec![
                        CodeDefinition {
                            name: "Interview".to_string(),
                            description: String::new(),
                        },
                        CodeDefinition {
                            name: "Survey".to_string(),
                            description: String::new(),
                        },
                    ],
                },
                ThemeDefinition {
                    name: "Findings".to_string(),
                    description: String::new(),
                    codes: vec![],
                },
            ],
        })
    }

    #[test]
    fn test_tag_builders() {
        assert_eq!(theme_tag("Methodology"), "oa:theme:Methodology");
        assert_eq!(code_tag("Interview"), "oa:code:Interview");
        assert_eq!(relation_tag("Methodology"), "oa:isCodeOf:Methodology");
    }

    #[test]
    fn test_guide_payload_shape() {
        let guide = sample_guide();
        let payload = guide.to_payload(&group(), "https://orcid.org/0000-0001");
        assert_eq!(
            payload.tags,
            vec!["oa:motivation:defining".to_string(), "oa:guide".to_string()]
        );
        assert_eq!(payload.motivation, Motivation::Defining);
        assert_eq!(payload.uri, "https://hypothes.is/groups/g1");
        assert_eq!(payload.permissions.read, vec!["group:g1".to_string()]);
        assert!(payload.target.is_empty());
        let body: GuideBody = serde_yaml::from_str(&payload.text).unwrap();
        assert_eq!(body.name.as_deref(), Some("Interview study"));
    }

    #[test]
    fn test_theme_payload_tags() {
        let guide = sample_guide();
        let payload = guide.themes[0].to_payload(&group(), "creator");
        assert_eq!(
            payload.tags,
            vec![
                "oa:theme:Methodology".to_string(),
                "oa:motivation:codebookDevelopment".to_string(),
            ]
        );
        let body: EntryBody = serde_yaml::from_str(&payload.text).unwrap();
        assert_eq!(body.description.as_deref(), Some("How the work was done"));
    }

    #[test]
    fn test_code_payload_tags_include_relation() {
        let guide = sample_guide();
        let payload = guide.themes[0].codes[0].to_payload(&group(), "creator");
        assert_eq!(
            payload.tags,
            vec![
                "oa:code:Interview".to_string(),
                "oa:isCodeOf:Methodology".to_string(),
                "oa:motivation:codebookDevelopment".to_string(),
            ]
        );
    }

    #[test]
    fn test_to_payloads_guide_first_then_themes_with_codes() {
        let guide = sample_guide();
        let payloads = guide.to_payloads(&group(), "creator");
        // guide + 2 themes + 2 codes
        assert_eq!(payloads.len(), 5);
        assert!(payloads[0].tags.contains(&GUIDE_TAG.to_string()));
        assert!(payloads[1].tags.contains(&"oa:theme:Methodology".to_string()));
        assert!(payloads[2].tags.contains(&"oa:code:Interview".to_string()));
    }

    #[test]
    fn test_from_annotations_roundtrip() {
        let annotations = vec![
            annotation("id-g", vec!["oa:motivation:defining", "oa:guide"], "name: Interview study\n"),
            annotation(
                "id-t1",
                vec!["oa:theme:Methodology", "oa:motivation:codebookDevelopment"],
                "description: How the work was done\n",
            ),
            annotation(
                "id-c1",
                vec![
                    "oa:code:Interview",
                    "oa:isCodeOf:Methodology",
                    "oa:motivation:codebookDevelopment",
                ],
                "description: ''\n",
            ),
            annotation(
                "id-t2",
                vec!["oa:theme:Findings", "oa:motivation:codebookDevelopment"],
                "description: ''\n",
            ),
        ];

        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert_eq!(guide.id.as_deref(), Some("id-g"));
        assert_eq!(guide.name, "Interview study");
        assert_eq!(guide.themes.len(), 2);
        assert_eq!(guide.themes[0].name, "Methodology");
        assert_eq!(guide.themes[0].codes.len(), 1);
        assert_eq!(guide.themes[0].codes[0].name, "Interview");
        assert_eq!(guide.themes[0].codes[0].theme_name, "Methodology");
        assert_eq!(guide.themes[1].codes.len(), 0);
    }

    #[test]
    fn test_from_annotations_requires_exactly_one_guide() {
        let no_guide = vec![annotation(
            "id-t1",
            vec!["oa:theme:Methodology"],
            "description: ''\n",
        )];
        assert!(AnnotationGuide::from_annotations(&no_guide).is_none());

        let two_guides = vec![
            annotation("id-g1", vec!["oa:guide"], "{}\n"),
            annotation("id-g2", vec!["oa:guide"], "{}\n"),
        ];
        assert!(AnnotationGuide::from_annotations(&two_guides).is_none());
    }

    #[test]
    fn test_from_annotations_guide_without_name_uses_default() {
        let annotations = vec![annotation("id-g", vec!["oa:guide"], "{}\n")];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert_eq!(guide.name, GROUP_NAME);
    }

    #[test]
    fn test_from_annotations_skips_orphan_codes() {
        let annotations = vec![
            annotation("id-g", vec!["oa:guide"], "{}\n"),
            annotation(
                "id-c1",
                vec!["oa:code:Lonely", "oa:isCodeOf:Nowhere"],
                "description: ''\n",
            ),
        ];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert!(guide.themes.is_empty());
    }

    #[test]
    fn test_from_annotations_skips_code_without_relation() {
        let annotations = vec![
            annotation("id-g", vec!["oa:guide"], "{}\n"),
            annotation("id-t1", vec!["oa:theme:Methodology"], "description: ''\n"),
            annotation("id-c1", vec!["oa:code:Unlinked"], "description: ''\n"),
        ];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert_eq!(guide.themes[0].codes.len(), 0);
    }

    #[test]
    fn test_from_annotations_skips_malformed_theme_body() {
        let annotations = vec![
            annotation("id-g", vec!["oa:guide"], "{}\n"),
            annotation("id-t1", vec!["oa:theme:Broken"], ": not yaml ["),
            annotation("id-t2", vec!["oa:theme:Fine"], "description: ok\n"),
        ];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert_eq!(guide.themes.len(), 1);
        assert_eq!(guide.themes[0].name, "Fine");
    }

    #[test]
    fn test_from_annotations_assigns_colors() {
        let annotations = vec![
            annotation("id-g", vec!["oa:guide"], "{}\n"),
            annotation("id-t1", vec!["oa:theme:A"], "description: ''\n"),
            annotation(
                "id-c1",
                vec!["oa:code:A1", "oa:isCodeOf:A"],
                "description: ''\n",
            ),
            annotation(
                "id-c2",
                vec!["oa:code:A2", "oa:isCodeOf:A"],
                "description: ''\n",
            ),
        ];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        let theme = &guide.themes[0];
        let theme_color = theme.color.unwrap();
        assert!((theme_color.a - MIN_ALPHA).abs() < 1e-6);
        // Two codes fan out across the alpha range: 0.5 and 0.8.
        let a1 = theme.codes[0].color.unwrap();
        let a2 = theme.codes[1].color.unwrap();
        assert!((a1.a - 0.5).abs() < 1e-6);
        assert!((a2.a - MAX_ALPHA).abs() < 1e-6);
        // Codes share the theme hue.
        assert_eq!((a1.r, a1.g, a1.b), (theme_color.r, theme_color.g, theme_color.b));
    }

    #[test]
    fn test_single_code_sits_at_max_alpha() {
        let mut theme = Theme::new("T", "");
        theme.color = Some(Color::rgb(10, 20, 30).with_alpha(MIN_ALPHA));
        theme.add_code(Code::new("only", "", "T"));
        assert!((theme.codes[0].color.unwrap().a - MAX_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_remove_code_recolors_remaining() {
        let mut theme = Theme::new("T", "");
        theme.color = Some(Color::rgb(10, 20, 30).with_alpha(MIN_ALPHA));
        theme.add_code(Code::new("a", "", "T"));
        theme.add_code(Code::new("b", "", "T"));
        theme.remove_code("a");
        assert_eq!(theme.codes.len(), 1);
        assert!((theme.codes[0].color.unwrap().a - MAX_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_add_theme_takes_last_palette_color_at_min_alpha() {
        let mut guide = AnnotationGuide::new("g");
        guide.add_theme(Theme::new("first", ""));
        let color = guide.themes[0].color.unwrap();
        assert!((color.a - MIN_ALPHA).abs() < 1e-6);
        guide.add_theme(Theme::new("second", ""));
        assert!(guide.themes[1].color.is_some());
        assert_ne!(
            guide.themes[0].color.unwrap().to_css(),
            guide.themes[1].color.unwrap().to_css()
        );
    }

    #[test]
    fn test_get_entry_finds_theme_and_code() {
        let annotations = vec![
            annotation("id-g", vec!["oa:guide"], "{}\n"),
            annotation("id-t1", vec!["oa:theme:A"], "description: ''\n"),
            annotation(
                "id-c1",
                vec!["oa:code:A1", "oa:isCodeOf:A"],
                "description: ''\n",
            ),
        ];
        let guide = AnnotationGuide::from_annotations(&annotations).unwrap();
        match guide.get_entry("id-t1").unwrap() {
            CodebookEntry::Theme(t) => assert_eq!(t.name, "A"),
            other => panic!("expected theme, got {other:?}"),
        }
        match guide.get_entry("id-c1").unwrap() {
            CodebookEntry::Code(c) => assert_eq!(c.name, "A1"),
            other => panic!("expected code, got {other:?}"),
        }
        assert!(guide.get_entry("missing").is_none());
    }

    #[test]
    fn test_entry_for_tags_prefers_code_over_theme() {
        let guide = sample_guide();
        let tags = vec![
            "oa:code:Interview".to_string(),
            "oa:isCodeOf:Methodology".to_string(),
        ];
        match guide.entry_for_tags(&tags).unwrap() {
            CodebookEntry::Code(c) => assert_eq!(c.name, "Interview"),
            other => panic!("expected code, got {other:?}"),
        }
        let theme_tags = vec!["oa:theme:Findings".to_string()];
        match guide.entry_for_tags(&theme_tags).unwrap() {
            CodebookEntry::Theme(t) => assert_eq!(t.name, "Findings"),
            other => panic!("expected theme, got {other:?}"),
        }
        assert!(guide.entry_for_tags(&["plain".to_string()]).is_none());
    }

    #[test]
    fn test_entry_annotation_tags() {
        let guide = sample_guide();
        let entry = guide.entry_for_tags(&["oa:code:Survey".to_string()]).unwrap();
        assert_eq!(
            entry.annotation_tags(),
            vec![
                "oa:code:Survey".to_string(),
                "oa:isCodeOf:Methodology".to_string()
            ]
        );
    }

    #[test]
    fn test_definition_roundtrip_through_annotations() {
        let guide = sample_guide();
        // Persist, pretend the store assigned ids, then reassemble.
        let payloads = guide.to_payloads(&group(), "creator");
        let annotations: Vec<Annotation> = payloads
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let mut a = annotation(&format!("id-{i}"), vec![], &p.text);
                a.tags = p.tags;
                a
            })
            .collect();
        let reloaded = AnnotationGuide::from_annotations(&annotations).unwrap();
        assert_eq!(reloaded.name, guide.name);
        assert_eq!(reloaded.themes.len(), guide.themes.len());
        assert_eq!(
            reloaded.themes[0].codes.len(),
            guide.themes[0].codes.len()
        );
    }
}
