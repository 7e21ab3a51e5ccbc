//! Fixed text used by the document compiler and the help screen.

/// Opening of the persona block; the persona text and a period follow.
pub const PERSONA_PREFIX: &str = "Você é";

pub const OBJECTIVE_LABEL: &str = "Objetivo:";
pub const AUDIENCE_LABEL: &str = "Público-alvo:";
pub const CONTEXT_LABEL: &str = "Contexto:";
pub const INPUTS_LABEL: &str = "Use os seguintes insumos:";
pub const TONE_LABEL: &str = "Tom e estilo:";
pub const FORMAT_LABEL: &str = "Formato de saída:";
pub const CONSTRAINTS_LABEL: &str = "Restrições:";
pub const EVALUATION_LABEL: &str = "Critérios de avaliação:";

/// Bullet used for tag-list items.
pub const BULLET: &str = "- ";

/// Closing instruction, always the last block of the document.
pub const CLOSING_INSTRUCTION: &str = "Antes de responder, verifique se todas as instruções acima foram atendidas. \
Se alguma informação estiver faltando ou for ambígua, faça perguntas de esclarecimento antes de prosseguir.";

pub const ADVISORY_FORMAT: &str =
    "Defina um formato de saída para que a resposta venha estruturada como você espera.";
pub const ADVISORY_CONSTRAINTS: &str =
    "Adicione restrições ou critérios de segurança para limitar o escopo da resposta.";
pub const ADVISORY_EVALUATION: &str =
    "Defina critérios de avaliação para saber quando a resposta está boa o suficiente.";

/// Comment header written to a freshly created global config file.
pub const CONFIG_HEADER: &str = "# promptwright configuration\n\
# Project overrides can live in a `.promptwright` file in the working directory.\n\n";

/// Help screen: section headers, each with (key, description) rows.
pub const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Edição",
        &[
            ("Tab / ↓", "Próxima pergunta"),
            ("Shift+Tab / ↑", "Pergunta anterior"),
            ("Enter", "Nova linha ou próxima pergunta"),
            ("←/→ Home/End", "Mover o cursor"),
        ],
    ),
    (
        "Documento",
        &[
            ("Ctrl+Y", "Copiar o prompt"),
            ("Ctrl+R", "Revisar respostas"),
            ("Ctrl+L", "Limpar todas as respostas"),
            ("PgUp/PgDn", "Rolar a pré-visualização"),
        ],
    ),
    (
        "Geral",
        &[("F1", "Esta ajuda"), ("Esc / Ctrl+C", "Sair")],
    ),
];

pub const RESET_CONFIRM_TEXT: &str = "Apagar todas as respostas e começar de novo?";
