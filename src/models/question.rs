// src/models/question.rs

use serde::Serialize;

/// Whether a question takes one selected option or a set of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
}

/// A survey question. Options are ordered and unique within the question.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: String,

    /// The text shown above the form control.
    pub title: String,

    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// Option labels in display order (e.g., "A. ChatGPT").
    pub options: Vec<String>,

    /// A required question blocks submission until answered.
    pub required: bool,
}

impl Question {
    pub fn single(id: &str, title: &str, options: &[&str]) -> Self {
        Self::new(id, title, QuestionKind::SingleChoice, options)
    }

    pub fn multi(id: &str, title: &str, options: &[&str]) -> Self {
        Self::new(id, title, QuestionKind::MultiChoice, options)
    }

    fn new(id: &str, title: &str, kind: QuestionKind, options: &[&str]) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            kind,
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.options.iter().any(|o| o == label)
    }
}

/// The fixed, ordered set of questions served to respondents.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The AI-usage pre-training questionnaire.
    ///
    /// q1, q5 and q6 are required; the multi-choice questions may be left empty.
    pub fn standard() -> Self {
        Self::new(vec![
            Question::single(
                "q1",
                "1. 您目前对AI工具（如豆包、ChatGPT等）的了解和使用程度是？",
                &[
                    "A. 完全不了解",
                    "B. 听说过，但未尝试",
                    "C. 偶尔尝试，未应用",
                    "D. 经常使用，辅助工作",
                    "E. 非常熟练",
                ],
            )
            .required(),
            Question::multi(
                "q2",
                "2. 您最希望AI帮您解决哪类问题？（多选）",
                &[
                    "A. 教学设计与教案",
                    "B. 课件与素材制作",
                    "C. 文档处理与办公效率",
                    "D. 学生评价与作业批改",
                    "E. 科研辅助与数据分析",
                ],
            ),
            Question::multi(
                "q3",
                "3. 您知道或使用过哪些类型的AI工具？（多选）",
                &[
                    "A. 语言大模型类",
                    "B. 绘画设计类",
                    "C. PPT生成类",
                    "D. 视频生成类",
                    "E. 办公辅助类",
                ],
            ),
            Question::multi(
                "q4",
                "4. 【大模型专项】您具体了解或使用过哪些大语言模型？（多选）",
                &[
                    "A. ChatGPT",
                    "B. Claude",
                    "C. Gemini",
                    "D. Copilot",
                    "E. 文心一言",
                    "F. 通义千问",
                    "G. Kimi",
                    "H. 智谱清言",
                    "I. 讯飞星火",
                    "J. 豆包",
                    "K. 腾讯混元",
                    "L. DeepSeek",
                    "M. 海螺AI",
                    "N. 天工AI",
                    "O. 百川智能",
                ],
            ),
            Question::single(
                "q5",
                "5. 使用AI工具时，您遇到的最大困难是什么？",
                &[
                    "A. 不知道好工具",
                    "B. 不会写提示词",
                    "C. 担心准确性/版权",
                    "D. 操作太复杂",
                    "E. 缺乏应用场景",
                ],
            )
            .required(),
            Question::single(
                "q6",
                "6. 您对本次AI培训最期待的收获是什么？",
                &[
                    "A. 了解AI概念趋势",
                    "B. 掌握实用工具",
                    "C. 学习写提示词",
                    "D. 看教学案例",
                    "E. 现场实操指导",
                ],
            )
            .required(),
        ])
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn standard_catalog_has_six_questions_in_order() {
        let catalog = Catalog::standard();
        let ids: Vec<&str> = catalog.all().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2", "q3", "q4", "q5", "q6"]);
    }

    #[test]
    fn required_flags_match_single_choice_questions() {
        let catalog = Catalog::standard();
        let required: Vec<&str> = catalog
            .all()
            .iter()
            .filter(|q| q.required)
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(required, ["q1", "q5", "q6"]);
        assert_eq!(catalog.get("q4").map(|q| q.kind), Some(QuestionKind::MultiChoice));
        assert_eq!(catalog.get("q4").map(|q| q.options.len()), Some(15));
    }

    #[test]
    fn options_are_unique_within_each_question() {
        for question in Catalog::standard().all() {
            let unique: HashSet<&String> = question.options.iter().collect();
            assert_eq!(unique.len(), question.options.len(), "{}", question.id);
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(Catalog::standard().get("q7").is_none());
    }

    #[test]
    fn serializes_kind_under_type_key() {
        let json = serde_json::to_value(Catalog::standard().get("q2")).unwrap();
        assert_eq!(json["type"], "multi_choice");
        assert_eq!(json["required"], false);
    }
}
