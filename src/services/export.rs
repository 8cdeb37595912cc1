// src/services/export.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{common::error::AppError, models::ventas::VentaRow};

/// BOM UTF-8 para que Excel abra correctamente tildes y eñes.
const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";

/// Encabezado fijo de 19 columnas de la exportación de la grilla.
const ENCABEZADOS: [&str; 19] = [
    "Suc.",
    "Tipo",
    "Comprobante",
    "Fecha",
    "Cód. Art.",
    "Descripción",
    "Info Adicional",
    "Cód. Cliente",
    "Cliente",
    "Rubro",
    "Medio de Pago",
    "Cuotas",
    "Cantidad",
    "Precio Neto",
    "Precio Unit.",
    "Total c/IVA",
    "Costo Unit.",
    "Costo Total",
    "Rentab. %",
];

/// Números con dos decimales y coma (1250000.5 → "1250000,50"); vacío si falta.
fn decimal_coma(valor: Option<Decimal>) -> String {
    valor
        .map(|v| format!("{:.2}", v).replace('.', ","))
        .unwrap_or_default()
}

/// Genera el CSV de la página cargada: punto y coma como separador, todos
/// los campos entre comillas, filas CRLF y BOM adelante.
pub fn ventas_a_csv(filas: &[VentaRow]) -> Result<Vec<u8>, AppError> {
    let mut escritor = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    escritor.write_record(ENCABEZADOS)?;

    for fila in filas {
        let fecha = fila.fecha.format("%d/%m/%y").to_string();
        let cuotas = fila
            .cant_cuotas
            .map(|c| c.to_string())
            .unwrap_or_default();
        let cantidad = format!("{:.0}", fila.cantidad);
        let precio_neto = decimal_coma(fila.precio_neto);
        let precio_unitario = decimal_coma(Some(fila.precio_unitario()));
        let total_c_iva = decimal_coma(Some(fila.importe_efectivo()));
        let costo_unitario = decimal_coma(fila.costo);
        let costo_total = decimal_coma(fila.costo_total());
        let rentabilidad = decimal_coma(Some(fila.porcentaje_rentabilidad));

        escritor.write_record([
            fila.nro_sucursal.as_str(),
            fila.t_comp.as_str(),
            fila.n_comp.as_str(),
            fecha.as_str(),
            fila.cod_articu.as_str(),
            fila.descripcio.as_str(),
            fila.desc_adic.as_deref().unwrap_or(""),
            fila.cod_client.as_str(),
            fila.razon_social.as_str(),
            fila.rubro.as_str(),
            fila.medio_pago(),
            cuotas.as_str(),
            cantidad.as_str(),
            precio_neto.as_str(),
            precio_unitario.as_str(),
            total_c_iva.as_str(),
            costo_unitario.as_str(),
            costo_total.as_str(),
            rentabilidad.as_str(),
        ])?;
    }

    let cuerpo = escritor
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("CSV sin volcar: {e}")))?;

    let mut salida = BOM_UTF8.to_vec();
    salida.extend_from_slice(&cuerpo);
    Ok(salida)
}

/// Nombre del archivo estampado con la fecha del día.
pub fn nombre_archivo(hoy: NaiveDate) -> String {
    format!("ventas_{}.csv", hoy.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exportar(filas: &[VentaRow]) -> (Vec<u8>, Vec<String>) {
        let bytes = ventas_a_csv(filas).unwrap();
        let texto = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let lineas = texto
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        (bytes, lineas)
    }

    #[test]
    fn arranca_con_bom_y_encabezado_de_19_columnas() {
        let (bytes, lineas) = exportar(&[]);
        assert_eq!(&bytes[..3], BOM_UTF8);
        // Todas las columnas entre comillas, separadas por punto y coma
        assert_eq!(lineas[0].matches(';').count(), 18);
        assert!(lineas[0].starts_with("\"Suc.\";\"Tipo\""));
        assert!(lineas[0].ends_with("\"Rentab. %\""));
    }

    #[test]
    fn la_fila_usa_coma_decimal_y_el_medio_de_pago_unificado() {
        let fila = VentaRow::de_prueba();
        let (_, lineas) = exportar(&[fila]);

        let linea = &lineas[1];
        assert_eq!(linea.matches(';').count(), 18);
        // cod_cond_venta == "1" → va la caja, no la condición pactada
        assert!(linea.contains("\"CAJA EFECTIVO\""));
        assert!(!linea.contains("\"CUENTA CORRIENTE\""));
        // Total c/IVA = importe prorrateado con coma decimal
        assert!(linea.contains("\"18000,00\""));
        // Costo total = 5500 × 2
        assert!(linea.contains("\"11000,00\""));
        // Fecha en dd/mm/aa
        assert!(linea.contains("\"15/03/24\""));
    }

    #[test]
    fn los_campos_con_comillas_se_escapan_duplicandolas() {
        let fila = VentaRow {
            descripcio: "ZAPATILLA \"RUNNER\" 42".into(),
            ..VentaRow::de_prueba()
        };
        let (_, lineas) = exportar(&[fila]);
        assert!(lineas[1].contains("\"ZAPATILLA \"\"RUNNER\"\" 42\""));
    }

    #[test]
    fn cuotas_ausentes_quedan_vacias() {
        let fila = VentaRow {
            cant_cuotas: None,
            precio_neto: None,
            ..VentaRow::de_prueba()
        };
        let (_, lineas) = exportar(&[fila]);
        // Campo vacío pero igual entre comillas
        assert!(lineas[1].contains("\"\";"));
    }

    #[test]
    fn nombre_con_fecha_estampada() {
        let hoy = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(nombre_archivo(hoy), "ventas_2024-07-09.csv");
    }
}
