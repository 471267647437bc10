//! The closed placeholder catalog.
//!
//! This table is the single source of truth for what a template may ask
//! for. Each entry names the literal token, the context section and key
//! that feed it, a description for template authors, and an example value.
//! The renderer's replacement map is *derived* from this table (see
//! [`crate::pipeline::context::RenderContext::flatten`]), so a token listed
//! here is guaranteed to resolve — at worst to an empty string — and a
//! token not listed here is simply left in the document for `inspect` to
//! flag.
//!
//! Adding a token is a four-place change: this table, the
//! extractor (if the value comes from the form), the context builder, and
//! the template author's documentation. Keeping the catalog closed is what
//! makes that lock-step checkable in tests.

use serde::Serialize;

/// Context section a placeholder draws its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Employee,
    Company,
    LegalRepresentative,
    Contract,
    StartDate,
    EndDate,
}

impl Section {
    /// Section name as it appears in the nested render context.
    pub fn name(self) -> &'static str {
        match self {
            Section::Employee => "employee",
            Section::Company => "company",
            Section::LegalRepresentative => "legalRepresentative",
            Section::Contract => "contract",
            Section::StartDate => "startDate",
            Section::EndDate => "endDate",
        }
    }
}

/// One supported placeholder token.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Placeholder {
    /// The literal token as written in templates, braces included.
    pub token: &'static str,
    /// Context address: which section and key supply the value.
    pub section: Section,
    pub key: &'static str,
    /// Description for template authors.
    pub description: &'static str,
    /// Example rendered value.
    pub example: &'static str,
}

const fn ph(
    token: &'static str,
    section: Section,
    key: &'static str,
    description: &'static str,
    example: &'static str,
) -> Placeholder {
    Placeholder {
        token,
        section,
        key,
        description,
        example,
    }
}

/// Every placeholder the renderer understands. The list is closed: an
/// unlisted token is never substituted.
pub const PLACEHOLDERS: &[Placeholder] = &[
    // ── Employee ─────────────────────────────────────────────────────────
    ph("{{nombre_completo}}", Section::Employee, "nombre_completo",
        "Nombre completo del colaborador.", "MARIO PEREZ"),
    ph("{{nombre_completo_titulo}}", Section::Employee, "nombre_completo_titulo",
        "Nombre del colaborador en formato título.", "Mario Perez"),
    ph("{{cui}}", Section::Employee, "cui",
        "CUI (DPI) del colaborador, agrupado 4/5/4.", "1234 56789 0123"),
    ph("{{cui_letras}}", Section::Employee, "cui_letras",
        "CUI del colaborador en letras, grupo por grupo.",
        "mil doscientos treinta y cuatro espacio …"),
    ph("{{edad_empleado}}", Section::Employee, "edad",
        "Edad del colaborador en números.", "30"),
    ph("{{edad_empleado_letras}}", Section::Employee, "edad_letras",
        "Edad del colaborador en letras.", "treinta"),
    ph("{{direccion}}", Section::Employee, "direccion",
        "Dirección del domicilio del colaborador.", "1ra Calle 1-23, Zona 1"),
    ph("{{estado_civil}}", Section::Employee, "estado_civil",
        "Estado civil del colaborador.", "Soltero"),
    ph("{{nacionalidad}}", Section::Employee, "nacionalidad",
        "Nacionalidad del colaborador.", "Guatemalteco"),
    ph("{{profesion}}", Section::Employee, "profesion",
        "Profesión u oficio del colaborador.", "Perito Contador"),
    ph("{{posicion}}", Section::Employee, "posicion",
        "Posición o cargo del colaborador.", "Asesor de Ventas"),
    ph("{{puesto}}", Section::Employee, "puesto",
        "Puesto del colaborador (alias de posición).", "Asesor de Ventas"),
    ph("{{colaborador_lugar_notificaciones}}", Section::Employee, "lugar_notificaciones",
        "Lugar donde el colaborador recibe notificaciones.", "1ra Calle 1-23, Zona 1"),
    // ── Contract ─────────────────────────────────────────────────────────
    ph("{{fecha_contrato}}", Section::Contract, "fecha",
        "Fecha de celebración del contrato, en prosa legal.",
        "el veintinueve (29) de enero del año dos mil veinticinco (2025)"),
    ph("{{monto}}", Section::Contract, "monto",
        "Monto de honorarios en formato numérico.", "Q.5,000.00"),
    ph("{{monto_letras}}", Section::Contract, "monto_letras",
        "Monto en letras.", "CINCO MIL QUETZALES EXACTOS"),
    ph("{{genero}}", Section::Contract, "genero",
        "Tratamiento del fedatario.", "El Notario"),
    // ── Start date ───────────────────────────────────────────────────────
    ph("{{día_letras}}", Section::StartDate, "dia_letras",
        "Día de inicio del contrato, en letras.", "uno"),
    ph("{{día_numeros}}", Section::StartDate, "dia",
        "Día de inicio del contrato, en número.", "1"),
    ph("{{mes_letras}}", Section::StartDate, "mes",
        "Mes de inicio del contrato, en letras.", "enero"),
    ph("{{año_letras}}", Section::StartDate, "anio_letras",
        "Año de inicio del contrato, en letras.", "dos mil veinticinco"),
    ph("{{año_numeros}}", Section::StartDate, "anio",
        "Año de inicio del contrato, en número.", "2025"),
    ph("{{fecha_inicio_completa}}", Section::StartDate, "completa",
        "Fecha de inicio en prosa corta.", "1 de enero de 2025"),
    // ── End date ─────────────────────────────────────────────────────────
    ph("{{vence_dia_letras}}", Section::EndDate, "dia_letras",
        "Día de vencimiento, en letras; N/A si es indefinido.", "treinta y uno"),
    ph("{{vence_dia_numeros}}", Section::EndDate, "dia",
        "Día de vencimiento, en número; N/A si es indefinido.", "31"),
    ph("{{vence_mes_letras}}", Section::EndDate, "mes",
        "Mes de vencimiento, en letras; N/A si es indefinido.", "diciembre"),
    ph("{{vence_año_letras}}", Section::EndDate, "anio_letras",
        "Año de vencimiento, en letras; N/A si es indefinido.", "dos mil veinticinco"),
    ph("{{vence_año_numeros}}", Section::EndDate, "anio",
        "Año de vencimiento, en número; N/A si es indefinido.", "2025"),
    ph("{{fecha_fin_completa}}", Section::EndDate, "completa",
        "Fecha de vencimiento en prosa corta, o la leyenda de plazo indefinido.",
        "Por tiempo indefinido"),
    // ── Company ──────────────────────────────────────────────────────────
    ph("{{empresa_contratante}}", Section::Company, "razon_social",
        "Razón social de la empresa contratante.", "Innovate Solutions, S.A."),
    ph("{{empresa_entidad}}", Section::Company, "razon_social",
        "Razón social de la empresa (alias).", "Innovate Solutions, S.A."),
    ph("{{empresa_autorizada_en}}", Section::Company, "autorizada_en",
        "Lugar de autorización de la entidad.", "la ciudad de Guatemala"),
    ph("{{empresa_fecha_autorizacion}}", Section::Company, "fecha_autorizacion",
        "Fecha de autorización, en prosa.", "el ocho (8) de febrero de 2024"),
    ph("{{empresa_autorizada_por}}", Section::Company, "autorizada_por",
        "Notario que autorizó la entidad.", "Notario Juan Pérez"),
    ph("{{empresa_inscrita_en}}", Section::Company, "inscrita_en",
        "Registro donde está inscrita la entidad.", "el Registro Mercantil General"),
    ph("{{empresa_numero_registro}}", Section::Company, "numero_registro",
        "Número de registro.", "12345"),
    ph("{{empresa_numero_registro_letras}}", Section::Company, "numero_registro_letras",
        "Número de registro en letras.", "doce mil trescientos cuarenta y cinco"),
    ph("{{empresa_numero_folio}}", Section::Company, "numero_folio",
        "Número de folio.", "250"),
    ph("{{empresa_numero_folio_letras}}", Section::Company, "numero_folio_letras",
        "Número de folio en letras.", "doscientos cincuenta"),
    ph("{{empresa_numero_libro}}", Section::Company, "numero_libro",
        "Número de libro.", "18"),
    ph("{{empresa_numero_libro_letras}}", Section::Company, "numero_libro_letras",
        "Número de libro en letras.", "dieciocho"),
    ph("{{empresa_tipo_libro}}", Section::Company, "tipo_libro",
        "Tipo de libro.", "de Sociedades Mercantiles"),
    ph("{{empresa_lugar_notificaciones}}", Section::Company, "lugar_notificaciones",
        "Dirección principal de la empresa.", "Avenida Reforma 1-23, Zona 10"),
    ph("{{empresa_segundo_lugar_notificaciones}}", Section::Company, "segundo_lugar_notificaciones",
        "Dirección secundaria de la empresa.", "5a Avenida 5-55, Zona 14"),
    // ── Legal representative ─────────────────────────────────────────────
    ph("{{rep_legal_nombre}}", Section::LegalRepresentative, "nombre_completo",
        "Nombre completo del representante legal.", "Ana María Rodriguez"),
    ph("{{rep_legal_edad}}", Section::LegalRepresentative, "edad",
        "Edad del representante legal.", "45"),
    ph("{{rep_legal_edad_letras}}", Section::LegalRepresentative, "edad_letras",
        "Edad del representante legal en letras.", "cuarenta y cinco"),
    ph("{{rep_legal_estado_civil}}", Section::LegalRepresentative, "estado_civil",
        "Estado civil del representante legal.", "Casado"),
    ph("{{rep_legal_profesion}}", Section::LegalRepresentative, "profesion",
        "Profesión del representante legal.", "Administradora de Empresas"),
    ph("{{rep_legal_nacionalidad}}", Section::LegalRepresentative, "nacionalidad",
        "Nacionalidad del representante legal.", "Guatemalteca"),
    ph("{{rep_legal_cui}}", Section::LegalRepresentative, "cui",
        "CUI del representante legal, agrupado 4/5/4.", "3003 54169 0101"),
    ph("{{rep_legal_cui_letras}}", Section::LegalRepresentative, "cui_letras",
        "CUI del representante legal en letras.", "tres mil tres espacio …"),
    ph("{{rep_legal_extendido_en}}", Section::LegalRepresentative, "extendido_en",
        "Lugar de extensión del documento de identidad.", "el municipio de Guatemala"),
];

/// Look up a token (braces included).
pub fn find(token: &str) -> Option<&'static Placeholder> {
    PLACEHOLDERS.iter().find(|p| p.token == token)
}
