use super::types::OutputLanguage;

/// Substitution point for the user's story. Appears exactly once per template.
pub const NARRATIVE_PLACEHOLDER: &str = "{narrative}";

pub const ENGLISH_HEADERS: [&str; 4] = [
    "### 1. The Payoff Matrix",
    "### 2. Nash Equilibrium",
    "### 3. Inverse Game Theory (Hidden Parameter)",
    "### 4. Mechanism Design (Solution)",
];

pub const CHINESE_HEADERS: [&str; 4] = [
    "### 1. 收益矩阵",
    "### 2. 纳什均衡",
    "### 3. 逆向博弈论（隐藏参数）",
    "### 4. 机制设计（解决方案）",
];

const ENGLISH_TEMPLATE: &str = r#"Role: Expert Game Theorist.
Task: Analyze this relationship conflict: "{narrative}"

Constraint: Be EXTREMELY CONCISE. No fluff. Use bullet points.
All utilities use a fixed integer scale from -10 (worst) to +10 (best).

Output exactly in this format:

### 1. The Payoff Matrix
(Use a standard Markdown Table. Do NOT use LaTeX arrays. Fill every cell with (User utility, Partner utility) on the -10 to +10 scale.)
| | Partner: Cooperate | Partner: Defect |
|---|---|---|
| **User: Cooperate** | (U, P) | (U, P) |
| **User: Defect** | (U, P) | (U, P) |

*(Briefly state the conflict type, e.g., "Prisoner's Dilemma" or "Chicken Game", in 1 sentence.)*

### 2. Nash Equilibrium
* **State:** [User Strategy, Partner Strategy]
* **Reason:** (Explain in 1 sentence why neither side can do better by changing strategy alone.)

### 3. Inverse Game Theory (Hidden Parameter)
* **Inference:** (e.g., "Partner's 'Face-Saving' utility > Relationship utility")
* **Evidence:** (Cite 1 specific behavior from the text)

### 4. Mechanism Design (Solution)
* **Action 1:** (Specific move to change payoffs)
* **Action 2:** (Specific move to change payoffs)
"#;

const CHINESE_TEMPLATE: &str = r#"【系统指令】无论下面的故事使用何种语言，你的全部回答都必须且只能使用简体中文，包括标题、表格和解释。

角色：资深博弈论专家。
任务：分析这段关系冲突："{narrative}"

约束：
- 极度简洁，不要废话，使用要点列表。
- 所有效用取值均为 -10（最差）到 +10（最好）之间的整数。
- 数学符号一律使用 LaTeX 写法：行内公式用 $...$ 包裹，例如 $U_{用户} > U_{伴侣}$，独立公式用 $$...$$ 包裹。

严格按照以下格式输出：

### 1. 收益矩阵
（使用标准 Markdown 表格，表格内不要使用 LaTeX 数组。每个单元格填写（用户效用, 伴侣效用），取值范围 -10 到 +10。）
| | 伴侣：合作 | 伴侣：背叛 |
|---|---|---|
| **用户：合作** | (U, P) | (U, P) |
| **用户：背叛** | (U, P) | (U, P) |

*（用一句话说明冲突类型，例如"囚徒困境"或"斗鸡博弈"。）*

### 2. 纳什均衡
* **状态：** [用户策略, 伴侣策略]
* **原因：** （用一句话解释为什么任何一方都无法通过单方面改变策略而获益。）

### 3. 逆向博弈论（隐藏参数）
* **推断：** （例如："伴侣的'面子'效用 > 关系效用"）
* **证据：** （引用文中 1 个具体行为）

### 4. 机制设计（解决方案）
* **行动 1：** （改变收益结构的具体举措）
* **行动 2：** （改变收益结构的具体举措）
"#;

pub fn template(language: OutputLanguage) -> &'static str {
    match language {
        OutputLanguage::English => ENGLISH_TEMPLATE,
        OutputLanguage::Chinese => CHINESE_TEMPLATE,
    }
}

/// Inserts `narrative` verbatim. The inserted text is not scanned again, so a
/// story that itself contains the placeholder is left as written.
pub fn build_prompt(narrative: &str, language: OutputLanguage) -> String {
    template(language).replacen(NARRATIVE_PLACEHOLDER, narrative, 1)
}
