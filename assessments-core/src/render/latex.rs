//! LaTeX question paper renderer
//!
//! Writes `{output_dir}/{type}/{id}.tex`; compiling the source to PDF is left
//! to whatever serves the storage bucket.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DocumentRenderer, RenderError};
use crate::model::{AssessmentId, AssessmentPayload, AssessmentType};

pub struct LatexRenderer {
    output_dir: PathBuf,
}

impl LatexRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the LaTeX source for an assessment
    pub fn render_source(assessment: &AssessmentPayload) -> String {
        let mut tex = String::new();
        tex.push_str("\\documentclass[11pt]{article}\n");
        tex.push_str("\\usepackage{amsmath,amssymb}\n");
        tex.push_str("\\begin{document}\n\n");

        tex.push_str("\\begin{center}\n");
        let _ = writeln!(tex, "{{\\Large \\textbf{{{}}}}}\\\\[4pt]", escape(&assessment.name));
        let _ = writeln!(tex, "Course: {}\\\\", escape(&assessment.course));
        let _ = writeln!(
            tex,
            "{} -- {}\\\\",
            assessment.start_date.format("%Y-%m-%d %H:%M"),
            assessment.end_date.format("%Y-%m-%d %H:%M UTC")
        );
        let _ = writeln!(
            tex,
            "Time: {} minutes \\quad Total marks: {}",
            assessment.total_time,
            format_marks(assessment.total_marks)
        );
        tex.push_str("\\end{center}\n");

        for section in &assessment.questions {
            let _ = writeln!(tex, "\n\\section*{{{}}}", escape(&section.section_name));
            if !section.description.is_empty() {
                let _ = writeln!(tex, "{}\n", escape(&section.description));
            }
            tex.push_str("\\begin{enumerate}\n");
            for question in &section.questions {
                // question_latex is already LaTeX
                let _ = writeln!(
                    tex,
                    "  \\item {} \\hfill [{} marks]",
                    question.question_latex,
                    format_marks(question.marks)
                );
            }
            tex.push_str("\\end{enumerate}\n");
        }

        tex.push_str("\n\\end{document}\n");
        tex
    }
}

#[async_trait]
impl DocumentRenderer for LatexRenderer {
    async fn render_assessment(
        &self,
        assessment_type: &AssessmentType,
        assessment_id: &AssessmentId,
        assessment: &AssessmentPayload,
    ) -> Result<String, RenderError> {
        let object_ref = format!("{}/{}.tex", assessment_type, assessment_id);
        let path = self.output_dir.join(&object_ref);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| RenderError::Write {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        tokio::fs::write(&path, Self::render_source(assessment))
            .await
            .map_err(|source| RenderError::Write {
                path: path.display().to_string(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Wrote question paper");
        Ok(object_ref)
    }
}

/// Escape LaTeX special characters in plain text
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

fn format_marks(marks: f64) -> String {
    if marks.fract() == 0.0 {
        format!("{}", marks as i64)
    } else {
        format!("{}", marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn payload() -> AssessmentPayload {
        serde_json::from_value(json!({
            "name": "Quiz #1 & review",
            "course": "math_101",
            "start_date": "2024-05-01T09:00:00Z",
            "end_date": "2024-05-01T10:00:00Z",
            "total_time": 60,
            "total_marks": 7.5,
            "questions": [{
                "section_name": "Warm-up",
                "description": "Answer 100%",
                "questions": [
                    { "question_id": "q1", "question_latex": "$\\frac{1}{2}$", "marks": 2.5 },
                    { "question_id": "q2", "question_latex": "$x^2$", "marks": 5 }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a_b & 50%"), "a\\_b \\& 50\\%");
        assert_eq!(escape("x^y~z"), "x\\textasciicircum{}y\\textasciitilde{}z");
        assert_eq!(escape("\\"), "\\textbackslash{}");
    }

    #[test]
    fn test_format_marks() {
        assert_eq!(format_marks(5.0), "5");
        assert_eq!(format_marks(2.5), "2.5");
    }

    #[test]
    fn test_render_source() {
        let tex = LatexRenderer::render_source(&payload());
        assert!(tex.starts_with("\\documentclass"));
        assert!(tex.contains("\\textbf{Quiz \\#1 \\& review}"));
        assert!(tex.contains("Course: math\\_101"));
        assert!(tex.contains("\\section*{Warm-up}"));
        assert!(tex.contains("Answer 100\\%"));
        // question bodies are passed through untouched
        assert!(tex.contains("\\item $\\frac{1}{2}$ \\hfill [2.5 marks]"));
        assert!(tex.contains("\\item $x^2$ \\hfill [5 marks]"));
        assert!(tex.contains("Total marks: 7.5"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[tokio::test]
    async fn test_render_assessment_writes_file() {
        let dir = TempDir::new().unwrap();
        let renderer = LatexRenderer::new(dir.path());
        let kind = AssessmentType::parse("quiz").unwrap();
        let id = AssessmentId::generate();

        let object_ref = renderer
            .render_assessment(&kind, &id, &payload())
            .await
            .unwrap();
        assert_eq!(object_ref, format!("quiz/{id}.tex"));

        let written = std::fs::read_to_string(dir.path().join(&object_ref)).unwrap();
        assert_eq!(written, LatexRenderer::render_source(&payload()));
    }
}
