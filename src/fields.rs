//! Questionnaire fields and their static descriptor table.

use ratatui::style::Color;

/// How a field collects its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Single-line free text.
    SingleLine,
    /// Multi-line free text.
    MultiLine,
    /// Comma-separated list of tags.
    TagList,
}

impl InputKind {
    /// Whether the field holds free text (as opposed to a tag list).
    pub fn is_text(self) -> bool {
        matches!(self, Self::SingleLine | Self::MultiLine)
    }

    /// Short label shown next to the editor.
    pub fn label(self) -> &'static str {
        match self {
            Self::SingleLine => "texto",
            Self::MultiLine => "texto longo",
            Self::TagList => "lista, separada por vírgulas",
        }
    }
}

/// One semantic slot of the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Objective,
    Audience,
    Tone,
    Format,
    Constraints,
    Inputs,
    Context,
    Evaluation,
    Persona,
}

/// Static description of a field.
#[derive(Debug)]
pub struct FieldDescriptor {
    pub field: Field,
    /// Display title.
    pub title: &'static str,
    /// Help text shown under the editor.
    pub description: &'static str,
    pub kind: InputKind,
    pub placeholder: Option<&'static str>,
    /// Whether the field counts towards the pending-required list.
    pub required: bool,
}

/// Number of tracked fields.
pub const FIELD_COUNT: usize = 9;

/// Descriptor table, in questionnaire order.
pub static FIELDS: [FieldDescriptor; FIELD_COUNT] = [
    FieldDescriptor {
        field: Field::Objective,
        title: "Objetivo central",
        description: "O que a IA deve entregar? Descreva a tarefa principal em uma frase.",
        kind: InputKind::MultiLine,
        placeholder: Some("Ex.: Escrever um plano de aula sobre frações"),
        required: true,
    },
    FieldDescriptor {
        field: Field::Audience,
        title: "Público-alvo e nível",
        description: "Para quem é a resposta e qual o nível de conhecimento dessa pessoa?",
        kind: InputKind::SingleLine,
        placeholder: Some("Ex.: Alunos do 6º ano, iniciantes"),
        required: true,
    },
    FieldDescriptor {
        field: Field::Tone,
        title: "Tom e estilo",
        description: "Como a resposta deve soar?",
        kind: InputKind::SingleLine,
        placeholder: Some("Ex.: Didático, acolhedor e direto"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Format,
        title: "Formato de saída",
        description: "Estrutura esperada: lista, tabela, e-mail, código, número de parágrafos...",
        kind: InputKind::SingleLine,
        placeholder: Some("Ex.: Tabela com colunas Etapa, Duração e Material"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Constraints,
        title: "Restrições e regras",
        description: "Limites que a IA deve respeitar: tamanho, temas proibidos, fontes, segurança.",
        kind: InputKind::TagList,
        placeholder: Some("Ex.: máximo 300 palavras, sem jargões, citar fontes"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Inputs,
        title: "Insumos disponíveis",
        description: "Materiais, dados ou referências que a IA deve usar.",
        kind: InputKind::TagList,
        placeholder: Some("Ex.: capítulo 3 do livro, planilha de notas"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Context,
        title: "Contexto",
        description: "Informações de fundo que ajudam a entender a situação.",
        kind: InputKind::MultiLine,
        placeholder: Some("Ex.: A turma teve dificuldade com números decimais"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Evaluation,
        title: "Critérios de avaliação",
        description: "Como saber se a resposta ficou boa?",
        kind: InputKind::MultiLine,
        placeholder: Some("Ex.: Cada etapa deve ter um objetivo mensurável"),
        required: false,
    },
    FieldDescriptor {
        field: Field::Persona,
        title: "Persona da IA",
        description: "Papel que a IA deve assumir ao responder.",
        kind: InputKind::SingleLine,
        placeholder: Some("Ex.: uma professora de matemática experiente"),
        required: false,
    },
];

impl Field {
    /// All fields in descriptor-table order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Objective,
        Field::Audience,
        Field::Tone,
        Field::Format,
        Field::Constraints,
        Field::Inputs,
        Field::Context,
        Field::Evaluation,
        Field::Persona,
    ];

    /// Position of this field in the descriptor table.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static FieldDescriptor {
        &FIELDS[self.index()]
    }

    pub fn title(self) -> &'static str {
        self.descriptor().title
    }

    pub fn kind(self) -> InputKind {
        self.descriptor().kind
    }

    pub fn is_required(self) -> bool {
        self.descriptor().required
    }

    /// Stable identifier used in answer sheets.
    pub fn key(self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::Audience => "audience",
            Self::Tone => "tone",
            Self::Format => "format",
            Self::Constraints => "constraints",
            Self::Inputs => "inputs",
            Self::Context => "context",
            Self::Evaluation => "evaluation",
            Self::Persona => "persona",
        }
    }

    /// Parse an answer-sheet key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key.trim())
    }

    /// Next field in questionnaire order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % FIELD_COUNT]
    }

    /// Previous field in questionnaire order, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + FIELD_COUNT - 1) % FIELD_COUNT]
    }

    /// Marker color for the field list.
    pub fn color(self, answered: bool) -> Color {
        match (answered, self.is_required()) {
            (true, _) => Color::Green,
            (false, true) => Color::Yellow,
            (false, false) => Color::DarkGray,
        }
    }
}
